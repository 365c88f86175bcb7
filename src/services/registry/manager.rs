use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;

use super::poller::Poller;
use super::types::{validate_endpoint_url, MonitorEndpoint, RegistryError};
use crate::services::checker::{CheckResult, HttpChecker};
use crate::services::metrics::MetricsRegistry;
use crate::services::storage::ResultStore;

pub const DEFAULT_STREAM_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Spawn a polling loop for each registered endpoint
    pub polling_enabled: bool,
    pub stream_capacity: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            polling_enabled: true,
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

struct Registered {
    endpoint: MonitorEndpoint,
    seq: u64,
    enabled: Arc<AtomicBool>,
}

struct PollHandle {
    task: JoinHandle<()>,
    cancel: oneshot::Sender<()>,
}

impl PollHandle {
    fn signal(self) -> JoinHandle<()> {
        // Err only means the loop already exited
        let _ = self.cancel.send(());
        self.task
    }
}

#[derive(Default)]
struct State {
    endpoints: HashMap<String, Registered>,
    pollers: HashMap<String, PollHandle>,
}

/// Set of monitored endpoints, each with its own polling loop.
///
/// Loops publish into one bounded result stream; a full stream drops the
/// result rather than stalling the loop.
pub struct EndpointRegistry {
    state: RwLock<State>,
    seq: AtomicU64,
    options: RegistryOptions,
    store: Option<Arc<dyn ResultStore>>,
    metrics: Option<Arc<MetricsRegistry>>,
    result_tx: mpsc::Sender<CheckResult>,
    result_rx: Mutex<Option<mpsc::Receiver<CheckResult>>>,
}

impl EndpointRegistry {
    pub fn new(options: RegistryOptions) -> Self {
        let (result_tx, result_rx) = mpsc::channel(options.stream_capacity.max(1));

        Self {
            state: RwLock::new(State::default()),
            seq: AtomicU64::new(1),
            options,
            store: None,
            metrics: None,
            result_tx,
            result_rx: Mutex::new(Some(result_rx)),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Register `url` and start polling it.
    pub async fn add(
        &self,
        url: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<MonitorEndpoint, RegistryError> {
        let url = validate_endpoint_url(url)?;
        let interval_seconds = interval.as_secs().max(1);
        let timeout_seconds = timeout.as_secs().max(1);

        let mut state = self.state.write().await;

        if state.endpoints.values().any(|r| r.endpoint.url == url) {
            return Err(RegistryError::Conflict(url));
        }

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let created_at = Utc::now();
        let endpoint = MonitorEndpoint {
            id: format!("endpoint_{}_{}", created_at.timestamp(), seq),
            url,
            interval_seconds,
            timeout_seconds,
            enabled: true,
            created_at,
        };
        let enabled = Arc::new(AtomicBool::new(true));

        if self.options.polling_enabled {
            let handle = self.spawn_poller(&endpoint, enabled.clone());
            state.pollers.insert(endpoint.id.clone(), handle);
        }

        state.endpoints.insert(
            endpoint.id.clone(),
            Registered {
                endpoint: endpoint.clone(),
                seq,
                enabled,
            },
        );
        self.update_gauge(&state);
        drop(state);

        tracing::info!(
            endpoint_id = %endpoint.id,
            url = %endpoint.url,
            interval_seconds,
            "Added endpoint"
        );

        Ok(endpoint)
    }

    fn spawn_poller(&self, endpoint: &MonitorEndpoint, enabled: Arc<AtomicBool>) -> PollHandle {
        let mut checker = HttpChecker::new(Duration::from_secs(endpoint.timeout_seconds));
        if let Some(metrics) = &self.metrics {
            checker = checker.with_metrics(metrics.clone());
        }

        let poller = Poller {
            endpoint_id: endpoint.id.clone(),
            url: endpoint.url.clone(),
            interval: Duration::from_secs(endpoint.interval_seconds),
            checker,
            enabled,
            store: self.store.clone(),
            results: self.result_tx.clone(),
            metrics: self.metrics.clone(),
        };

        let (cancel, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(poller.run(cancel_rx));

        PollHandle { task, cancel }
    }

    /// Unregister `id` and signal its loop. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Option<MonitorEndpoint> {
        let (removed, handle) = self
            .detach(|state| state.endpoints.contains_key(id).then(|| id.to_string()))
            .await?;
        if let Some(handle) = handle {
            let _ = handle.signal();
        }
        Some(removed)
    }

    /// Non-blocking stop; returns whether anything was registered under `id`.
    pub async fn stop(&self, id: &str) -> bool {
        self.remove(id).await.is_some()
    }

    /// Like [`stop`](Self::stop) but waits for the loop task to finish.
    pub async fn stop_and_wait(&self, id: &str) -> bool {
        let Some((_, handle)) = self
            .detach(|state| state.endpoints.contains_key(id).then(|| id.to_string()))
            .await
        else {
            return false;
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.signal().await {
                tracing::error!(endpoint_id = %id, error = %e, "Polling task ended abnormally");
            }
        }
        true
    }

    pub async fn remove_by_url(&self, url: &str) -> Option<MonitorEndpoint> {
        let url = url.trim();
        let (removed, handle) = self
            .detach(|state| {
                state
                    .endpoints
                    .iter()
                    .find(|(_, r)| r.endpoint.url == url)
                    .map(|(id, _)| id.clone())
            })
            .await?;
        if let Some(handle) = handle {
            let _ = handle.signal();
        }
        Some(removed)
    }

    /// Take the endpoint and its loop handle out of both maps in one write.
    async fn detach<F>(&self, find: F) -> Option<(MonitorEndpoint, Option<PollHandle>)>
    where
        F: FnOnce(&State) -> Option<String>,
    {
        let mut state = self.state.write().await;
        let id = find(&*state)?;
        let registered = state.endpoints.remove(&id)?;
        let handle = state.pollers.remove(&id);
        self.update_gauge(&state);
        drop(state);

        tracing::info!(endpoint_id = %id, url = %registered.endpoint.url, "Removed endpoint");
        Some((registered.endpoint, handle))
    }

    /// Pause or resume probing without tearing the loop down.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<MonitorEndpoint, RegistryError> {
        let mut state = self.state.write().await;
        let registered = state.endpoints.get_mut(id).ok_or(RegistryError::NotFound)?;

        registered.enabled.store(enabled, Ordering::Release);
        registered.endpoint.enabled = enabled;

        tracing::info!(endpoint_id = %id, enabled, "Endpoint polling toggled");
        Ok(registered.endpoint.clone())
    }

    pub async fn get(&self, id: &str) -> Option<MonitorEndpoint> {
        let state = self.state.read().await;
        state.endpoints.get(id).map(|r| r.endpoint.clone())
    }

    /// Snapshot in registration order
    pub async fn list(&self) -> Vec<MonitorEndpoint> {
        let state = self.state.read().await;
        let mut registered: Vec<&Registered> = state.endpoints.values().collect();
        registered.sort_by_key(|r| r.seq);
        registered.into_iter().map(|r| r.endpoint.clone()).collect()
    }

    pub async fn urls(&self) -> Vec<String> {
        self.list().await.into_iter().map(|e| e.url).collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.endpoints.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Receiving end of the result stream. Only the first caller gets it.
    pub fn take_result_stream(&self) -> Option<mpsc::Receiver<CheckResult>> {
        self.result_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Stop every polling loop and wait for all of them to exit.
    pub async fn shutdown(&self) {
        let handles: Vec<(String, PollHandle)> = {
            let mut state = self.state.write().await;
            state.pollers.drain().collect()
        };

        if handles.is_empty() {
            return;
        }

        tracing::info!(count = handles.len(), "Stopping polling loops");

        let tasks: Vec<(String, JoinHandle<()>)> = handles
            .into_iter()
            .map(|(id, handle)| (id, handle.signal()))
            .collect();
        for (id, task) in tasks {
            if let Err(e) = task.await {
                tracing::error!(endpoint_id = %id, error = %e, "Polling task ended abnormally");
            }
        }
    }

    fn update_gauge(&self, state: &State) {
        if let Some(metrics) = &self.metrics {
            metrics.monitored_endpoints.set(state.endpoints.len() as f64);
        }
    }
}
