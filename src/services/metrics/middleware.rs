use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

/// Middleware to collect HTTP request metrics
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    state
        .metrics
        .http_requests_total
        .with_label_values(&[&method, &path, &status])
        .inc();

    state
        .metrics
        .http_request_duration_seconds
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Normalize path to reduce cardinality
/// Converts /api/monitors/endpoint_1700000000_3 -> /api/monitors/:id
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| if is_id_like(segment) { ":id" } else { segment })
        .collect();

    format!("/{}", normalized.join("/"))
}

/// Registry ids look like `endpoint_<unix>_<seq>`; bare numbers are ids too.
fn is_id_like(segment: &str) -> bool {
    if let Some(rest) = segment.strip_prefix("endpoint_") {
        return rest.chars().all(|c| c.is_ascii_digit() || c == '_');
    }

    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}
