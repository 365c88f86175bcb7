use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use super::types::CheckResult;
use crate::services::metrics::MetricsRegistry;

/// Performs HTTP health checks with a fixed per-instance timeout
#[derive(Clone)]
pub struct HttpChecker {
    client: Client,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("api-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build probe HTTP client, falling back to defaults");
                Client::default()
            });

        Self {
            client,
            timeout,
            limiter: None,
            metrics: None,
        }
    }

    /// Cap the number of probes doing network I/O at the same time.
    /// Zero means unlimited.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.limiter = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a single URL. Never fails: transport errors end up in `error`.
    pub async fn check(&self, url: &str) -> CheckResult {
        let _permit = match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };

        let checked_at = Utc::now();
        let start = Instant::now();

        let result = match self.client.get(url).send().await {
            // Latency is time to headers; the body is never read
            Ok(response) => CheckResult::from_status(
                url,
                response.status().as_u16(),
                start.elapsed(),
                checked_at,
            ),
            Err(e) => {
                let elapsed = start.elapsed();
                let message = if e.is_timeout() {
                    format!("request timed out after {}ms", self.timeout.as_millis())
                } else {
                    describe_error(&e)
                };
                CheckResult::failed(url, message, elapsed, checked_at)
            }
        };

        self.record(&result);
        result
    }

    /// Probe every URL concurrently and wait for all of them.
    ///
    /// Output order matches `urls` regardless of completion order.
    pub async fn check_multiple(&self, urls: &[String]) -> Vec<CheckResult> {
        let handles: Vec<_> = urls
            .iter()
            .cloned()
            .map(|url| {
                let checker = self.clone();
                tokio::spawn(async move { checker.check(&url).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(urls)
            .map(|(joined, url)| match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "Probe task failed");
                    CheckResult::failed(
                        url.clone(),
                        format!("probe task failed: {}", e),
                        Duration::ZERO,
                        Utc::now(),
                    )
                }
            })
            .collect()
    }

    fn record(&self, result: &CheckResult) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        let outcome = if result.error.is_some() {
            "error"
        } else if result.is_healthy {
            "healthy"
        } else {
            "unhealthy"
        };

        metrics.checks_total.with_label_values(&[outcome]).inc();
        metrics
            .check_duration_seconds
            .with_label_values(&[outcome])
            .observe(result.response_time.as_secs_f64());
    }
}

/// reqwest's top-level message hides the cause ("error sending request");
/// walk the source chain so DNS/connect/TLS failures are readable.
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
