use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::AppState;
use crate::modules::monitor::schema::{
    validation_message, EnableRequest, EndpointListResponse, EndpointRequest, EndpointStatus,
    ErrorResponse, MessageResponse, MonitorRequest, ResultStatistics, ResultsQuery, ResultsResponse,
};
use crate::services::insight::Insight;
use crate::services::registry::{MonitorEndpoint, RegistryError};

/// Upper bound on the completion call made while serving /api/insights
pub const INSIGHT_REQUEST_BUDGET: Duration = Duration::from_secs(20);

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

fn registry_error(e: RegistryError) -> ApiError {
    let status = match e {
        RegistryError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        RegistryError::Conflict(_) => StatusCode::CONFLICT,
        RegistryError::NotFound => StatusCode::NOT_FOUND,
    };
    api_error(status, e.to_string())
}

/// Any malformed body is a 400, including a well-formed body of the wrong shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid JSON"))
}

// =============================================================================
// GET /api/status - Check every registered endpoint now
// =============================================================================

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<Vec<EndpointStatus>> {
    let urls = state.registry.urls().await;
    let results = state.checker.check_multiple(&urls).await;

    if state.settings.persist_status_checks && !results.is_empty() {
        if let Err(e) = state.store.save_batch(&results).await {
            tracing::warn!(count = results.len(), error = %e, "Failed to persist status batch");
            state
                .metrics
                .persistence_failures_total
                .with_label_values(&["status"])
                .inc();
        }
    }

    Json(results.into_iter().map(EndpointStatus::from).collect())
}

// =============================================================================
// GET /api/insights - Model or rule-based insights over a fresh batch
// =============================================================================

pub async fn get_insights(State(state): State<Arc<AppState>>) -> Json<Vec<Insight>> {
    if let Some(cached) = state.insight_cache.get().await {
        return Json(cached);
    }

    let generation = state.insight_cache.generation().await;
    let urls = state.registry.urls().await;
    let results = state.checker.check_multiple(&urls).await;
    let analysis = state
        .insight_engine
        .analyze_within(&results, INSIGHT_REQUEST_BUDGET)
        .await;

    if let Some(cause) = analysis.cause() {
        tracing::warn!(error = %cause, "Serving rule-based insights");
    }

    let insights = analysis.into_insights();
    state.insight_cache.put(generation, insights.clone()).await;

    Json(insights)
}

// =============================================================================
// /api/endpoints - URL-addressed registration
// =============================================================================

pub async fn list_endpoints(State(state): State<Arc<AppState>>) -> Json<EndpointListResponse> {
    Json(EndpointListResponse {
        urls: state.registry.urls().await,
    })
}

pub async fn add_endpoint(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EndpointRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let req = json_body(payload)?;

    if let Err(e) = req.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, validation_message(&e)));
    }

    state
        .registry
        .add(
            &req.url,
            state.settings.check_interval,
            state.settings.request_timeout,
        )
        .await
        .map_err(registry_error)?;
    state.insight_cache.invalidate().await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Endpoint added successfully")),
    ))
}

pub async fn remove_endpoint(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EndpointRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let req = json_body(payload)?;

    if req.url.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "URL is required"));
    }

    state
        .registry
        .remove_by_url(&req.url)
        .await
        .ok_or_else(|| registry_error(RegistryError::NotFound))?;
    state.insight_cache.invalidate().await;

    Ok(Json(MessageResponse::new("Endpoint removed successfully")))
}

// =============================================================================
// /api/monitors - id-addressed registration with per-endpoint settings
// =============================================================================

pub async fn list_monitors(State(state): State<Arc<AppState>>) -> Json<Vec<MonitorEndpoint>> {
    Json(state.registry.list().await)
}

pub async fn create_monitor(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MonitorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MonitorEndpoint>), ApiError> {
    let req = json_body(payload)?;

    if let Err(e) = req.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, validation_message(&e)));
    }

    let interval = req
        .interval_seconds
        .map(Duration::from_secs)
        .unwrap_or(state.settings.check_interval);
    let timeout = req
        .timeout_seconds
        .map(Duration::from_secs)
        .unwrap_or(state.settings.request_timeout);

    let endpoint = state
        .registry
        .add(&req.url, interval, timeout)
        .await
        .map_err(registry_error)?;
    state.insight_cache.invalidate().await;

    Ok((StatusCode::CREATED, Json(endpoint)))
}

pub async fn update_monitor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<EnableRequest>, JsonRejection>,
) -> Result<Json<MonitorEndpoint>, ApiError> {
    let req = json_body(payload)?;

    let endpoint = state
        .registry
        .set_enabled(&id, req.enabled)
        .await
        .map_err(registry_error)?;

    Ok(Json(endpoint))
}

/// Idempotent: unknown ids still answer 204
pub async fn delete_monitor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.registry.stop(&id).await {
        state.insight_cache.invalidate().await;
    }
    StatusCode::NO_CONTENT
}

// =============================================================================
// GET /api/results - Stored history for one URL
// =============================================================================

pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "url query parameter is required"))?
        .to_string();

    let results = state
        .store
        .query_recent(&url, query.effective_limit())
        .await
        .map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to query results");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let statistics = ResultStatistics::from_results(&results);

    Ok(Json(ResultsResponse {
        url,
        results: results.into_iter().map(EndpointStatus::from).collect(),
        statistics,
    }))
}
