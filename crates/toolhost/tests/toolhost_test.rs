use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use skillbridge_core::types::ToolDescriptor;
use skillbridge_toolhost::{default_registry, LeaveLedger, ToolhostServer, ToolhostServerConfig};

async fn app() -> axum::Router {
    let ledger = Arc::new(LeaveLedger::seeded());
    let registry = default_registry(ledger).await.unwrap();
    ToolhostServer::new(ToolhostServerConfig::default(), Arc::new(registry)).build_router()
}

async fn post_execute(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/execute")
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
async fn catalog_entries_parse_back_into_descriptors() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    for entry in json["tools"].as_array().unwrap() {
        let descriptor = ToolDescriptor::from_wire(
            entry["name"].as_str().unwrap(),
            entry["description"].as_str().unwrap(),
            &entry["parameters"],
        );
        assert!(!descriptor.name.is_empty());
        // Every parameter published in the schema survives the parse.
        let declared = entry["parameters"]["properties"].as_object().unwrap().len();
        assert_eq!(descriptor.parameters.len(), declared);
    }
}

#[tokio::test]
async fn over_budget_leave_application_is_rejected_in_band() {
    let app = app().await;

    // Jake has 15 days; ask for 16.
    let dates: Vec<String> = (1..=16).map(|d| format!("2025-10-{:02}", d)).collect();
    let (status, json) = post_execute(
        app.clone(),
        json!({
            "name": "apply_leave",
            "parameters": {"employee_id": "Jake", "leave_dates": dates.join(",")},
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("insufficient leave balance"));

    // Balance untouched after the rejected application.
    let (_, json) = post_execute(
        app,
        json!({"name": "get_leave_balance", "parameters": {"employee_id": "Jake"}}),
    )
    .await;
    assert_eq!(json["result"]["balance"], 15);
}

#[tokio::test]
async fn invalid_dates_are_rejected_before_touching_the_ledger() {
    let app = app().await;

    let (status, json) = post_execute(
        app.clone(),
        json!({
            "name": "apply_leave",
            "parameters": {"employee_id": "Raghu", "leave_dates": "next tuesday"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("invalid date"));

    let (_, json) = post_execute(
        app,
        json!({"name": "get_leave_balance", "parameters": {"employee_id": "Raghu"}}),
    )
    .await;
    assert_eq!(json["result"]["balance"], 18);
}

#[tokio::test]
async fn calculator_over_http() {
    let (status, json) = post_execute(
        app().await,
        json!({"name": "calculate", "parameters": {"expression": "15 * 8 + 32"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["result"]["result"], 152.0);
}
