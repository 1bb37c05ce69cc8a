use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use skillbridge_core::{
    retry::RetryPolicy,
    traits::ToolTransport,
    types::{InvocationOutcome, ParameterSpec, ToolDescriptor},
    Error, Result,
};
use skillbridge_bridge::{BridgeServer, BridgeServerConfig, SkillCatalog};

/// Scripted upstream tool host.
struct ScriptedToolHost {
    catalog: Vec<ToolDescriptor>,
    healthy: Mutex<bool>,
    invoke_outcome: Mutex<Option<InvocationOutcome>>,
}

impl ScriptedToolHost {
    fn new() -> Self {
        Self {
            catalog: vec![
                ToolDescriptor::new(
                    "add_numbers",
                    "Add two numbers together",
                    vec![
                        ParameterSpec::required_integer("a", "First number"),
                        ParameterSpec::required_integer("b", "Second number"),
                    ],
                ),
                ToolDescriptor::new(
                    "get_weather",
                    "Get weather for a location",
                    vec![ParameterSpec::required_string("location", "City name")],
                ),
            ],
            healthy: Mutex::new(true),
            invoke_outcome: Mutex::new(None),
        }
    }

    fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().unwrap() = healthy;
    }

    fn script_invoke(&self, outcome: InvocationOutcome) {
        *self.invoke_outcome.lock().unwrap() = Some(outcome);
    }
}

#[async_trait]
impl ToolTransport for ScriptedToolHost {
    async fn fetch_catalog(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.catalog.clone())
    }

    async fn invoke(&self, _name: &str, args: Value) -> InvocationOutcome {
        self.invoke_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(InvocationOutcome::Success(args))
    }

    async fn health(&self) -> Result<()> {
        if *self.healthy.lock().unwrap() {
            Ok(())
        } else {
            Err(Error::transport("connection refused (scripted)"))
        }
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_invoke(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/skills/invoke")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn agent_card_publishes_translated_skills() {
    let host = Arc::new(ScriptedToolHost::new());
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));
    catalog.refresh().await.unwrap();

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, card) = get_json(app, "/.well-known/agent.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["protocol"], "a2a-1.0");
    assert_eq!(card["name"], "LeaveManagementAgent");

    let skills = card["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 2);
    assert_eq!(skills[0]["id"], "add_numbers");
    assert_eq!(skills[0]["invocation_target"], "add_numbers");
    assert_eq!(skills[0]["parameters"][0]["required"], true);
}

#[tokio::test]
async fn card_is_unavailable_before_first_discovery() {
    let host = Arc::new(ScriptedToolHost::new());
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, body) = get_json(app, "/.well-known/agent.json").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn invoke_proxies_and_keeps_envelope() {
    let host = Arc::new(ScriptedToolHost::new());
    host.script_invoke(InvocationOutcome::Success(json!(7)));
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));
    catalog.refresh().await.unwrap();

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, body) = post_invoke(
        app,
        json!({"skill_id": "add_numbers", "arguments": {"a": 3, "b": 4}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["result"], 7);
}

#[tokio::test]
async fn tool_error_stays_in_band() {
    let host = Arc::new(ScriptedToolHost::new());
    host.script_invoke(InvocationOutcome::ToolError(
        "tool execution failed: insufficient leave balance".to_string(),
    ));
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));
    catalog.refresh().await.unwrap();

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, body) = post_invoke(
        app,
        json!({"skill_id": "get_weather", "arguments": {"location": "Tokyo"}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("insufficient leave balance"));
}

#[tokio::test]
async fn unknown_skill_is_404() {
    let host = Arc::new(ScriptedToolHost::new());
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));
    catalog.refresh().await.unwrap();

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, body) = post_invoke(app, json!({"skill_id": "frobnicate"})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("no such skill"));
}

#[tokio::test]
async fn upstream_transport_failure_is_502() {
    let host = Arc::new(ScriptedToolHost::new());
    host.script_invoke(InvocationOutcome::TransportError(
        "connection refused".to_string(),
    ));
    let catalog = Arc::new(SkillCatalog::new(host, fast_retry()));
    catalog.refresh().await.unwrap();

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog).build_router();
    let (status, body) = post_invoke(
        app,
        json!({"skill_id": "add_numbers", "arguments": {"a": 1, "b": 2}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn health_reflects_upstream_and_staleness() {
    let host = Arc::new(ScriptedToolHost::new());
    let catalog = Arc::new(SkillCatalog::new(host.clone(), fast_retry()));

    let app = BridgeServer::new(BridgeServerConfig::default(), catalog.clone()).build_router();

    // Upstream reachable but no catalog yet.
    let (_, body) = get_json(app.clone(), "/health").await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["upstream"], true);

    catalog.refresh().await.unwrap();
    let (_, body) = get_json(app.clone(), "/health").await;
    assert_eq!(body["status"], "ok");

    host.set_healthy(false);
    let (_, body) = get_json(app, "/health").await;
    assert_eq!(body["status"], "down");
    assert_eq!(body["upstream"], false);
}
