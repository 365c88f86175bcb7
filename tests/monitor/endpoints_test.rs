use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::TestContext;

// =============================================================================
// INTEGRATION TESTS - /api/endpoints
// =============================================================================

#[tokio::test]
async fn test_add_list_and_remove_endpoint() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/endpoints")
        .json(&json!({ "url": "  https://example.com/health " }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Endpoint added successfully");

    let list: Value = ctx.server.get("/api/endpoints").await.json();
    assert_eq!(list, json!({ "urls": ["https://example.com/health"] }));

    let response = ctx
        .server
        .delete("/api/endpoints")
        .json(&json!({ "url": "https://example.com/health" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Endpoint removed successfully");

    let list: Value = ctx.server.get("/api/endpoints").await.json();
    assert_eq!(list["urls"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_duplicate_is_conflict() {
    let ctx = TestContext::new();
    let payload = json!({ "url": "https://example.com" });

    ctx.server.post("/api/endpoints").json(&payload).await.assert_status(StatusCode::CREATED);
    let response = ctx.server.post("/api/endpoints").json(&payload).await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "URL already being monitored");
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let ctx = TestContext::new();

    let response = ctx.server.post("/api/endpoints").json(&json!({ "url": "" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "URL is required");

    let response = ctx
        .server
        .post("/api/endpoints")
        .json(&json!({ "url": "ftp://example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "URL must start with http:// or https://"
    );

    let response = ctx.server.post("/api/endpoints").text("{not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid JSON");

    let list: Value = ctx.server.get("/api/endpoints").await.json();
    assert!(list["urls"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_unknown_or_empty() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .delete("/api/endpoints")
        .json(&json!({ "url": "https://missing.example" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "URL not found");

    let response = ctx.server.delete("/api/endpoints").json(&json!({ "url": " " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let ctx = TestContext::new();
    let url = format!("https://example.com/{}", "a".repeat(20 * 1024));

    let response = ctx.server.post("/api/endpoints").json(&json!({ "url": url })).await;

    assert!(response.status_code().is_client_error());
    let list: Value = ctx.server.get("/api/endpoints").await.json();
    assert!(list["urls"].as_array().unwrap().is_empty());
}
