use std::sync::Arc;

use api_monitor::config::{environment::Config, init_db};
use api_monitor::modules::monitor::CheckResultCrud;
use api_monitor::services::checker::{CheckResult, HttpChecker};
use api_monitor::services::insight::{InsightCache, InsightEngine, OpenAiCompletionClient};
use api_monitor::services::metrics::MetricsRegistry;
use api_monitor::services::registry::{EndpointRegistry, RegistryOptions};
use api_monitor::services::storage::{MemoryResultStore, ResultStore};
use api_monitor::{AppSettings, AppState};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_monitor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::from_env()?;

    let metrics = MetricsRegistry::new()?;

    let store: Arc<dyn ResultStore> = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            tracing::info!("Connected to MySQL");
            Arc::new(CheckResultCrud::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping check results in memory");
            Arc::new(MemoryResultStore::new())
        }
    };

    let checker = HttpChecker::new(config.request_timeout)
        .with_max_concurrency(config.max_concurrency)
        .with_metrics(metrics.clone());

    let mut insight_engine = InsightEngine::new()
        .with_timeout(config.ai.timeout)
        .with_metrics(metrics.clone());
    if config.ai.enabled {
        let client = OpenAiCompletionClient::new(
            config.ai.base_url.clone(),
            config.ai.api_key.clone(),
            &config.ai.model,
        );
        tracing::info!(base_url = %config.ai.base_url, model = client.model(), "AI insights enabled");
        insight_engine = insight_engine.with_client(Arc::new(client));
    } else {
        tracing::info!("AI insights disabled, using rule-based analysis");
    }

    let registry = Arc::new(
        EndpointRegistry::new(RegistryOptions {
            polling_enabled: config.polling_enabled,
            stream_capacity: config.result_stream_capacity,
        })
        .with_store(store.clone())
        .with_metrics(metrics.clone()),
    );

    if let Some(stream) = registry.take_result_stream() {
        tokio::spawn(consume_results(stream));
    }

    for url in &config.monitor_urls {
        if let Err(e) = registry
            .add(url, config.check_interval, config.request_timeout)
            .await
        {
            tracing::warn!(url = %url, error = %e, "Skipping configured endpoint");
        }
    }

    let state = Arc::new(AppState {
        registry: registry.clone(),
        checker,
        insight_engine,
        insight_cache: InsightCache::new(config.insight_cache_ttl),
        store,
        metrics,
        settings: AppSettings {
            check_interval: config.check_interval,
            request_timeout: config.request_timeout,
            persist_status_checks: config.persist_status_checks,
        },
    });

    let app = api_monitor::create_app(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Single consumer of the polling result stream
async fn consume_results(mut stream: mpsc::Receiver<CheckResult>) {
    while let Some(result) = stream.recv().await {
        tracing::debug!(
            url = %result.url,
            healthy = result.is_healthy,
            response_time_ms = result.response_time_ms(),
            "Polling result received"
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
