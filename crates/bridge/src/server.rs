//! Axum-based HTTP server for the bridge.
//!
//! Republishes the translated catalog as an A2A-style agent card and
//! proxies skill invocations to the upstream tool host. In-band failures
//! stay in the envelope with HTTP 200; unknown skills are 404 and upstream
//! transport failures (after retries) are 502, so callers can tell the
//! three kinds apart without parsing message text.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use skillbridge_core::{
    types::{AgentCard, InvocationResponse},
    Error, Result,
};

use crate::catalog::SkillCatalog;

/// Bridge server configuration.
#[derive(Debug, Clone)]
pub struct BridgeServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Published agent name.
    pub name: String,
    /// Published agent description.
    pub description: String,
    /// Endpoint advertised on the agent card.
    pub endpoint: String,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for BridgeServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            name: "LeaveManagementAgent".to_string(),
            description: "A2A agent bridging to the leave management tool server".to_string(),
            endpoint: "http://localhost:8000".to_string(),
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// Discovery cache and invocation proxy.
    pub catalog: Arc<SkillCatalog>,
    /// Config snapshot for the agent card.
    pub config: BridgeServerConfig,
}

/// Bridge server.
pub struct BridgeServer {
    config: BridgeServerConfig,
    state: Arc<AppState>,
}

impl BridgeServer {
    pub fn new(config: BridgeServerConfig, catalog: Arc<SkillCatalog>) -> Self {
        let state = Arc::new(AppState {
            catalog,
            config: config.clone(),
        });
        Self { config, state }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/.well-known/agent.json", get(card_handler))
            .route("/skills/invoke", post(invoke_handler))
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

        tracing::info!(addr = %addr, "Bridge starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::server(format!("server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Skill invocation request.
#[derive(Debug, Deserialize)]
pub struct InvokeSkillRequest {
    /// Skill to invoke.
    pub skill_id: String,
    /// Arguments object; defaults to empty.
    #[serde(default)]
    pub arguments: Value,
}

/// Health response with the upstream probe result.
#[derive(Debug, Serialize)]
pub struct BridgeHealthResponse {
    /// "ok", "degraded" (stale or missing catalog), or "down".
    pub status: String,
    /// Whether the upstream tool host answered its probe.
    pub upstream: bool,
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Agent card handler.
///
/// Serves the cached (possibly stale) catalog; 503 only if discovery has
/// never succeeded, since there is no card to publish yet.
async fn card_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.list_skills() {
        Ok(skills) => {
            let card = AgentCard::new(
                state.config.name.clone(),
                state.config.description.clone(),
                state.config.endpoint.clone(),
                skills,
            );
            (StatusCode::OK, Json(serde_json::json!(card)))
        }
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "error", "message": err.to_string()})),
        ),
    }
}

/// Skill invocation handler.
async fn invoke_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InvokeSkillRequest>,
) -> impl IntoResponse {
    tracing::info!(skill = %payload.skill_id, "Invoking skill");

    match state.catalog.invoke_skill(&payload.skill_id, payload.arguments).await {
        Ok(outcome) => match InvocationResponse::from_outcome(&outcome) {
            Some(envelope) => (StatusCode::OK, Json(envelope)),
            // Transport outcome after exhausted retries: report at the HTTP
            // level, never inside a 200 envelope.
            None => (
                StatusCode::BAD_GATEWAY,
                Json(InvocationResponse::Error {
                    message: "upstream tool host unreachable".to_string(),
                }),
            ),
        },
        Err(Error::SkillNotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(InvocationResponse::Error {
                message: format!("no such skill: {}", id),
            }),
        ),
        Err(Error::CatalogUnavailable(detail)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(InvocationResponse::Error {
                message: format!("skill catalog unavailable: {}", detail),
            }),
        ),
        Err(err) => {
            tracing::error!(skill = %payload.skill_id, error = %err, "Invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InvocationResponse::Error {
                    message: err.to_string(),
                }),
            )
        }
    }
}

/// Health handler probing the upstream host, independent of the cache.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let upstream = state.catalog.upstream_health().await.is_ok();

    let status = if !upstream {
        "down"
    } else if state.catalog.is_degraded() || !state.catalog.has_catalog() {
        "degraded"
    } else {
        "ok"
    };

    Json(BridgeHealthResponse {
        status: status.to_string(),
        upstream,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
