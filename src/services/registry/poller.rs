use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::services::checker::{CheckResult, HttpChecker};
use crate::services::metrics::MetricsRegistry;
use crate::services::storage::ResultStore;

/// Everything one endpoint's loop needs; owned by the loop task.
pub(crate) struct Poller {
    pub endpoint_id: String,
    pub url: String,
    pub interval: Duration,
    pub checker: HttpChecker,
    pub enabled: Arc<AtomicBool>,
    pub store: Option<Arc<dyn ResultStore>>,
    pub results: mpsc::Sender<CheckResult>,
    pub metrics: Option<Arc<MetricsRegistry>>,
}

impl Poller {
    /// Tick until cancelled. A dropped sender counts as cancellation.
    pub async fn run(self, mut cancel: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(endpoint_id = %self.endpoint_id, url = %self.url, "Polling loop started");

        loop {
            tokio::select! {
                biased;
                _ = &mut cancel => break,
                _ = ticker.tick() => {
                    if self.enabled.load(Ordering::Acquire) {
                        self.poll_once().await;
                    }
                }
            }
        }

        tracing::debug!(endpoint_id = %self.endpoint_id, "Polling loop stopped");
    }

    async fn poll_once(&self) {
        let result = self.checker.check(&self.url).await;

        if result.is_healthy {
            tracing::info!(
                url = %result.url,
                status = result.status_code,
                response_time_ms = result.response_time_ms(),
                "✅ Endpoint healthy"
            );
        } else {
            tracing::warn!(
                url = %result.url,
                status = result.status_code,
                response_time_ms = result.response_time_ms(),
                error = result.error.as_deref().unwrap_or(""),
                "❌ Endpoint unhealthy"
            );
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&result).await {
                tracing::warn!(url = %self.url, error = %e, "Failed to persist check result");
                if let Some(metrics) = &self.metrics {
                    metrics.persistence_failures_total.with_label_values(&["poll"]).inc();
                }
            }
        }

        self.publish(result);
    }

    fn publish(&self, result: CheckResult) {
        let reason = match self.results.try_send(result) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(_)) => "full",
            Err(mpsc::error::TrySendError::Closed(_)) => "closed",
        };

        tracing::debug!(endpoint_id = %self.endpoint_id, reason, "Result stream unavailable, dropping result");
        if let Some(metrics) = &self.metrics {
            metrics.stream_dropped_total.inc();
        }
    }
}
