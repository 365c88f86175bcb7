use api_monitor::services::insight::{InsightEngine, OpenAiCompletionClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{target_server, TestContext};

// =============================================================================
// INTEGRATION TESTS - GET /api/insights
// =============================================================================

async fn completion_server(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(&server)
        .await;
    server
}

fn engine_for(server: &MockServer) -> InsightEngine {
    InsightEngine::new()
        .with_client(Arc::new(OpenAiCompletionClient::new(server.uri(), "test-key", "")))
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_rule_based_insights_without_ai() {
    let target = target_server().await;
    let ctx = TestContext::new();
    ctx.register(&format!("{}/ok", target.uri())).await;
    let down = format!("{}/down", target.uri());
    ctx.register(&down).await;

    let response = ctx.server.get("/api/insights").await;

    response.assert_status_ok();
    let insights: Vec<Value> = response.json();
    assert_eq!(insights.first().unwrap()["type"], "alert");
    assert!(insights[0]["content"].as_str().unwrap().contains(&down));
    assert_eq!(insights[0]["confidence"], 1.0);
    assert_eq!(insights.last().unwrap()["type"], "info");
    assert!(insights.iter().all(|i| i["type"] != "success"));
}

#[tokio::test]
async fn test_no_endpoints_no_insights() {
    let ctx = TestContext::new();

    let insights: Vec<Value> = ctx.server.get("/api/insights").await.json();

    assert!(insights.is_empty());
}

#[tokio::test]
async fn test_model_insights_are_served_and_normalized() {
    let target = target_server().await;
    let ai = completion_server(
        r#"Here is my analysis:
[{"title":"All good","content":"Everything responds","type":"success","confidence":0.9},
 {"title":"Odd","content":"Unknown label","type":"critical","confidence":1.4}]"#,
    )
    .await;
    let ctx = TestContext::with_engine(engine_for(&ai), Duration::ZERO);
    ctx.register(&format!("{}/ok", target.uri())).await;

    let insights: Vec<Value> = ctx.server.get("/api/insights").await.json();

    assert_eq!(insights.len(), 2);
    assert_eq!(insights[0]["title"], "All good");
    assert_eq!(insights[1]["type"], "info");
    assert_eq!(insights[1]["confidence"], 1.0);
    assert!(insights[0]["generatedAt"].is_string());
}

#[tokio::test]
async fn test_unparsable_model_output_falls_back() {
    let target = target_server().await;
    let ai = completion_server("Sorry, I can't produce JSON today.").await;
    let ctx = TestContext::with_engine(engine_for(&ai), Duration::ZERO);
    ctx.register(&format!("{}/ok", target.uri())).await;

    let insights: Vec<Value> = ctx.server.get("/api/insights").await.json();

    let types: Vec<&str> = insights.iter().map(|i| i["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["success", "info"]);
    assert_eq!(
        ctx.state
            .metrics
            .insight_failures_total
            .with_label_values(&["unparsable"])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_completion_error_falls_back() {
    let target = target_server().await;
    let ai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ai)
        .await;
    let ctx = TestContext::with_engine(engine_for(&ai), Duration::ZERO);
    ctx.register(&format!("{}/down", target.uri())).await;

    let insights: Vec<Value> = ctx.server.get("/api/insights").await.json();

    assert_eq!(insights[0]["type"], "alert");
}

#[tokio::test]
async fn test_insights_are_cached_within_ttl() {
    let target = target_server().await;
    let ai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant",
                "content": "[{\"title\":\"t\",\"content\":\"c\",\"type\":\"info\",\"confidence\":0.5}]" } }]
        })))
        .expect(1)
        .mount(&ai)
        .await;
    let ctx = TestContext::with_engine(engine_for(&ai), Duration::from_secs(60));
    ctx.register(&format!("{}/ok", target.uri())).await;

    let first: Vec<Value> = ctx.server.get("/api/insights").await.json();
    let second: Vec<Value> = ctx.server.get("/api/insights").await.json();

    assert_eq!(first, second);
}
