pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use modules::metrics::metrics_routes;
use modules::monitor::monitor_routes;
use services::checker::HttpChecker;
use services::insight::{InsightCache, InsightEngine};
use services::metrics::{metrics_middleware, MetricsRegistry};
use services::registry::EndpointRegistry;
use services::storage::ResultStore;

/// Request-handling knobs taken from configuration
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Defaults for endpoints registered over HTTP
    pub check_interval: Duration,
    pub request_timeout: Duration,
    pub persist_status_checks: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(15),
            request_timeout: Duration::from_secs(5),
            persist_status_checks: true,
        }
    }
}

pub struct AppState {
    pub registry: Arc<EndpointRegistry>,
    pub checker: HttpChecker,
    pub insight_engine: InsightEngine,
    pub insight_cache: InsightCache,
    pub store: Arc<dyn ResultStore>,
    pub metrics: Arc<MetricsRegistry>,
    pub settings: AppSettings,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(metrics_routes())
        .nest("/api", monitor_routes())
        .layer(middleware::from_fn_with_state(state.clone(), metrics_middleware))
        .layer(RequestBodyLimitLayer::new(16 * 1024)) // 16KB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "API Monitor"
}
