use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::TestContext;

// =============================================================================
// INTEGRATION TESTS - /api/monitors
// =============================================================================

#[tokio::test]
async fn test_create_monitor_with_custom_settings() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example", "intervalSeconds": 30, "timeoutSeconds": 3 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert!(body["id"].as_str().unwrap().starts_with("endpoint_"));
    assert_eq!(body["url"], "https://a.example");
    assert_eq!(body["intervalSeconds"], 30);
    assert_eq!(body["timeoutSeconds"], 3);
    assert_eq!(body["enabled"], true);
}

#[tokio::test]
async fn test_create_monitor_uses_defaults() {
    let ctx = TestContext::new();

    let body: Value = ctx
        .server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example" }))
        .await
        .json();

    assert_eq!(body["intervalSeconds"], 15);
    assert_eq!(body["timeoutSeconds"], 5);
}

#[tokio::test]
async fn test_create_monitor_validation() {
    let ctx = TestContext::new();

    ctx.server
        .post("/api/monitors")
        .json(&json!({ "url": "example.com" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    ctx.server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example", "timeoutSeconds": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monitors_share_registry_with_endpoints() {
    let ctx = TestContext::new();
    ctx.server
        .post("/api/endpoints")
        .json(&json!({ "url": "https://a.example" }))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let list: Vec<Value> = ctx.server.get("/api/monitors").await.json();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["url"], "https://a.example");
}

#[tokio::test]
async fn test_toggle_monitor() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example" }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = ctx
        .server
        .patch(&format!("/api/monitors/{}", id))
        .json(&json!({ "enabled": false }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["enabled"], false);

    let list: Vec<Value> = ctx.server.get("/api/monitors").await.json();
    assert_eq!(list[0]["enabled"], false);

    ctx.server
        .patch("/api/monitors/endpoint_0_0")
        .json(&json!({ "enabled": true }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_monitor_is_idempotent() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/monitors")
        .json(&json!({ "url": "https://a.example" }))
        .await
        .json();
    let path = format!("/api/monitors/{}", created["id"].as_str().unwrap());

    ctx.server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    ctx.server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);

    let list: Vec<Value> = ctx.server.get("/api/monitors").await.json();
    assert!(list.is_empty());
}
