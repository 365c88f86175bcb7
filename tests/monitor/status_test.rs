use api_monitor::services::storage::ResultStore;
use serde_json::Value;

use crate::common::{target_server, TestContext};

// =============================================================================
// INTEGRATION TESTS - GET /api/status
// =============================================================================

#[tokio::test]
async fn test_status_with_no_endpoints_is_empty() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/status").await;

    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert!(body.is_empty());
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_status_reports_each_endpoint_in_registration_order() {
    let target = target_server().await;
    let ctx = TestContext::new();
    let ok = format!("{}/ok", target.uri());
    let down = format!("{}/down", target.uri());
    ctx.register(&ok).await;
    ctx.register(&down).await;

    let response = ctx.server.get("/api/status").await;

    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 2);

    assert_eq!(body[0]["url"], ok.as_str());
    assert_eq!(body[0]["isHealthy"], true);
    assert_eq!(body[0]["statusCode"], 200);
    assert!(body[0]["responseTime"].is_u64());
    assert!(body[0]["lastChecked"].is_string());
    assert!(body[0].get("error").is_none());

    assert_eq!(body[1]["url"], down.as_str());
    assert_eq!(body[1]["isHealthy"], false);
    assert_eq!(body[1]["statusCode"], 503);
}

#[tokio::test]
async fn test_status_captures_transport_errors() {
    let ctx = TestContext::new();
    // Nothing listens on port 9 locally
    ctx.register("http://127.0.0.1:9/health").await;

    let body: Vec<Value> = ctx.server.get("/api/status").await.json();

    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["statusCode"], 0);
    assert_eq!(body[0]["isHealthy"], false);
    assert!(body[0]["error"].is_string());
}

#[tokio::test]
async fn test_status_persists_batch() {
    let target = target_server().await;
    let ctx = TestContext::new();
    let ok = format!("{}/ok", target.uri());
    ctx.register(&ok).await;

    ctx.server.get("/api/status").await.assert_status_ok();
    ctx.server.get("/api/status").await.assert_status_ok();

    let stored = ctx.store.query_recent(&ok, 10).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.is_healthy));
}

#[tokio::test]
async fn test_status_survives_persistence_failure() {
    let target = target_server().await;
    let ctx = TestContext::with_rejecting_store();
    let ok = format!("{}/ok", target.uri());
    let down = format!("{}/down", target.uri());
    ctx.register(&ok).await;
    ctx.register(&down).await;

    let response = ctx.server.get("/api/status").await;

    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["url"], ok.as_str());
    assert_eq!(body[0]["isHealthy"], true);
    assert_eq!(body[1]["url"], down.as_str());
    assert_eq!(body[1]["isHealthy"], false);
    assert_eq!(
        ctx.state
            .metrics
            .persistence_failures_total
            .with_label_values(&["status"])
            .get(),
        1
    );
}
