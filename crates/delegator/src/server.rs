//! Axum-based HTTP server for the delegator.
//!
//! The consumer-facing surface: a chat endpoint, the delegator's own agent
//! card (proxied skills plus the local `general_chat` fallback), and a
//! health probe.

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use skillbridge_core::{
    types::{AgentCard, IncomingRequest, SkillDescriptor},
    Error, Result,
};

use crate::delegate::Delegator;

/// Delegator server configuration.
#[derive(Debug, Clone)]
pub struct DelegatorServerConfig {
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

impl Default for DelegatorServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            name: "PersonalAgent".to_string(),
            description: "Conversational agent delegating to remote skills".to_string(),
            endpoint: "http://localhost:8001".to_string(),
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub delegator: Arc<Delegator>,
    pub config: DelegatorServerConfig,
}

/// Delegator server.
pub struct DelegatorServer {
    config: DelegatorServerConfig,
    state: Arc<AppState>,
}

impl DelegatorServer {
    pub fn new(config: DelegatorServerConfig, delegator: Arc<Delegator>) -> Self {
        let state = Arc::new(AppState {
            delegator,
            config: config.clone(),
        });
        Self { config, state }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/chat", post(chat_handler))
            .route("/.well-known/agent.json", get(card_handler))
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

        tracing::info!(addr = %addr, "Delegator starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::server(format!("server error: {}", e)))?;

        Ok(())
    }
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

/// Chat handler: classify, delegate or answer locally, always 200.
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IncomingRequest>,
) -> impl IntoResponse {
    let trace_id = Uuid::new_v4().to_string();

    tracing::info!(
        trace_id = %trace_id,
        message_len = request.message.len(),
        "Processing chat request"
    );

    Json(state.delegator.handle(&trace_id, &request).await)
}

/// Agent card handler: the proxied skills plus the local fallback skill.
async fn card_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut skills = state.delegator.known_skills();
    skills.push(SkillDescriptor {
        id: "general_chat".to_string(),
        name: "general_chat".to_string(),
        description: "General conversation handled locally".to_string(),
        parameters: Vec::new(),
        invocation_target: "general_chat".to_string(),
    });

    Json(AgentCard::new(
        state.config.name.clone(),
        state.config.description.clone(),
        state.config.endpoint.clone(),
        skills,
    ))
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
