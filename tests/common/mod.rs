use api_monitor::services::checker::{CheckResult, HttpChecker};
use api_monitor::services::insight::{InsightCache, InsightEngine};
use api_monitor::services::metrics::MetricsRegistry;
use api_monitor::services::registry::{EndpointRegistry, RegistryOptions};
use api_monitor::services::storage::{MemoryResultStore, ResultStore, StorageError};
use api_monitor::{create_app, AppSettings, AppState};
use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryResultStore>,
}

#[allow(dead_code)]
impl TestContext {
    /// Polling off, no completion service, insight cache disabled
    pub fn new() -> Self {
        Self::with_engine(InsightEngine::new(), Duration::ZERO)
    }

    pub fn with_engine(insight_engine: InsightEngine, insight_cache_ttl: Duration) -> Self {
        let store = Arc::new(MemoryResultStore::new());
        Self::build(insight_engine, insight_cache_ttl, store.clone(), store)
    }

    /// Every write to the result store fails; `store` stays empty
    pub fn with_rejecting_store() -> Self {
        Self::build(
            InsightEngine::new(),
            Duration::ZERO,
            Arc::new(RejectingStore),
            Arc::new(MemoryResultStore::new()),
        )
    }

    fn build(
        insight_engine: InsightEngine,
        insight_cache_ttl: Duration,
        result_store: Arc<dyn ResultStore>,
        store: Arc<MemoryResultStore>,
    ) -> Self {
        let metrics = MetricsRegistry::new().expect("Failed to create metrics registry");

        let registry = Arc::new(
            EndpointRegistry::new(RegistryOptions {
                polling_enabled: false,
                ..Default::default()
            })
            .with_metrics(metrics.clone()),
        );

        let state = Arc::new(AppState {
            registry,
            checker: HttpChecker::new(Duration::from_secs(2)).with_metrics(metrics.clone()),
            insight_engine: insight_engine.with_metrics(metrics.clone()),
            insight_cache: InsightCache::new(insight_cache_ttl),
            store: result_store,
            metrics,
            settings: AppSettings::default(),
        });

        let server = TestServer::new(create_app(state.clone())).expect("Failed to create test server");

        Self { server, state, store }
    }

    pub async fn register(&self, url: &str) {
        self.state
            .registry
            .add(url, Duration::from_secs(60), Duration::from_secs(2))
            .await
            .expect("Failed to register endpoint");
    }
}

/// Result store whose writes always fail
#[allow(dead_code)]
pub struct RejectingStore;

#[async_trait]
impl ResultStore for RejectingStore {
    async fn save(&self, _result: &CheckResult) -> Result<(), StorageError> {
        Err(StorageError::InvalidRecord("store unavailable".into()))
    }

    async fn save_batch(&self, _results: &[CheckResult]) -> Result<(), StorageError> {
        Err(StorageError::InvalidRecord("store unavailable".into()))
    }

    async fn query_recent(&self, _url: &str, _limit: u32) -> Result<Vec<CheckResult>, StorageError> {
        Ok(Vec::new())
    }
}

/// Probe target answering `/ok` with 200 and `/down` with 503
#[allow(dead_code)]
pub async fn target_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    server
}
