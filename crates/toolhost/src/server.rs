//! Axum-based HTTP server for the tool host.
//!
//! Publishes the MCP-style surface: a well-known manifest, the tool catalog,
//! and the execute endpoint. In-band failures travel in the response envelope
//! with HTTP 200; only malformed requests get non-200 statuses.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use skillbridge_core::{
    traits::ToolRegistry,
    types::InvocationResponse,
    Error, Result,
};

/// Tool host server configuration.
#[derive(Debug, Clone)]
pub struct ToolhostServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Published server name.
    pub name: String,
    /// Published server description.
    pub description: String,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for ToolhostServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            name: "LeaveManagementServer".to_string(),
            description: "Tool server for leave management and utility tools".to_string(),
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Tool registry backing the catalog and execution.
    pub registry: Arc<dyn ToolRegistry>,
    /// Config snapshot for the manifest.
    pub config: ToolhostServerConfig,
}

/// Tool host server.
pub struct ToolhostServer {
    config: ToolhostServerConfig,
    state: Arc<AppState>,
}

impl ToolhostServer {
    pub fn new(config: ToolhostServerConfig, registry: Arc<dyn ToolRegistry>) -> Self {
        let state = Arc::new(AppState {
            registry,
            config: config.clone(),
        });
        Self { config, state }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/.well-known/mcp.json", get(manifest_handler))
            .route("/tools", get(tools_handler))
            .route("/execute", post(execute_handler))
            .route("/health", get(health_handler))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::server(format!("failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, "Tool host starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::server(format!("server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Execute request: a tool name and its arguments.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// Tool to invoke.
    pub name: String,
    /// Arguments object; defaults to empty.
    #[serde(default)]
    pub parameters: Value,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Well-known manifest handler.
async fn manifest_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "name": state.config.name,
        "description": state.config.description,
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "mcp",
        "endpoints": {
            "tools": "/tools",
            "execute": "/execute",
        },
    }))
}

/// Tool catalog handler. Entries carry a JSON Schema parameters object.
async fn tools_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tools: Vec<Value> = state
        .registry
        .list()
        .await
        .iter()
        .map(|descriptor| {
            json!({
                "name": descriptor.name,
                "description": descriptor.description,
                "parameters": descriptor.schema_object(),
            })
        })
        .collect();

    Json(json!({ "tools": tools }))
}

/// Execute handler.
///
/// Unknown tools and failing tools both come back as HTTP 200 with an error
/// envelope; the caller distinguishes in-band failure from transport failure
/// by whether an envelope arrived at all.
async fn execute_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteRequest>,
) -> impl IntoResponse {
    tracing::info!(tool = %payload.name, "Executing tool");

    let outcome = state.registry.invoke(&payload.name, payload.parameters).await;

    match InvocationResponse::from_outcome(&outcome) {
        Some(envelope) => (StatusCode::OK, Json(envelope)),
        // The registry never produces a transport outcome.
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InvocationResponse::Error {
                message: "internal invocation failure".to_string(),
            }),
        ),
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::{default_registry, LeaveLedger};

    async fn test_router() -> Router {
        let ledger = Arc::new(LeaveLedger::seeded());
        let registry = default_registry(ledger).await.unwrap();
        ToolhostServer::new(ToolhostServerConfig::default(), Arc::new(registry)).build_router()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn manifest_lists_endpoints() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/.well-known/mcp.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "LeaveManagementServer");
        assert_eq!(json["endpoints"]["execute"], "/execute");
    }

    #[tokio::test]
    async fn tools_endpoint_publishes_catalog() {
        let app = test_router().await;

        let response = app
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let tools = json["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 7);
        assert_eq!(tools[0]["name"], "get_weather");
        assert_eq!(tools[0]["parameters"]["type"], "object");

        let balance = tools.iter().find(|t| t["name"] == "get_leave_balance").unwrap();
        assert_eq!(balance["parameters"]["required"], json!(["employee_id"]));
    }

    #[tokio::test]
    async fn execute_success_envelope() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/execute")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({"name": "add_numbers", "parameters": {"a": 3, "b": 4}}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["result"], 7);
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_in_band_error() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/execute")
                    .header("Content-Type", "application/json")
                    .body(Body::from(json!({"name": "frobnicate"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        // In-band failure: still HTTP 200, error travels in the envelope.
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn execute_mutates_ledger() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/execute")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({
                            "name": "apply_leave",
                            "parameters": {
                                "employee_id": "Steve",
                                "leave_dates": "2025-09-01,2025-09-02",
                            },
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["result"]["remaining_balance"], 18);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/execute")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({
                            "name": "get_leave_balance",
                            "parameters": {"employee_id": "Steve"},
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["result"]["balance"], 18);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_router().await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}
