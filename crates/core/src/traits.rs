//! Core traits for Skillbridge.
//!
//! These traits define the contracts between the three roles and their
//! external collaborators. Network transports and the answer generator are
//! trait objects so every seam can be exercised with the mocks in
//! [`crate::mocks`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{
    AgentCard, InvocationOutcome, ParameterSpec, ToolDescriptor,
};

// =============================================================================
// Tool Host Traits
// =============================================================================

/// A named, schema-described callable owned by the tool registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique, stable tool name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Declared parameters.
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Execute the tool with already-validated arguments.
    ///
    /// An `Err` here is a tool-level failure; the registry converts it into
    /// an in-band `ToolError` and never lets it escape further.
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Registry owning the canonical set of callable tools.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Register a new tool. Fails if the name is already taken.
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()>;

    /// The current catalog, in registration order. Pure; stable across
    /// repeated calls absent registration changes.
    async fn list(&self) -> Vec<ToolDescriptor>;

    /// Invoke a tool by name.
    ///
    /// Always returns a tagged outcome: unknown names and invalid arguments
    /// become `ToolError`, as do handler failures. A single tool's failure
    /// never crashes the registry.
    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome;
}

// =============================================================================
// Bridge Traits
// =============================================================================

/// Client-side view of a remote tool host, as consumed by the bridge.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Fetch the remote tool catalog. `Err(Transport)` on network failure.
    async fn fetch_catalog(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a remote tool. Network failures surface as the
    /// `TransportError` outcome, distinct from in-band `ToolError`s.
    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome;

    /// Probe the remote host's liveness endpoint.
    async fn health(&self) -> Result<()>;
}

// =============================================================================
// Delegator Traits
// =============================================================================

/// Client-side view of a remote skill-publishing agent, as consumed by the
/// delegator.
#[async_trait]
pub trait SkillTransport: Send + Sync {
    /// Fetch the agent card (skill catalog).
    async fn fetch_card(&self) -> Result<AgentCard>;

    /// Invoke a remote skill by id.
    ///
    /// `Err(SkillNotFound)` when the remote agent does not know the id
    /// (a signal to re-run discovery); network failures surface as the
    /// `TransportError` outcome.
    async fn invoke_skill(&self, skill_id: &str, args: Value) -> Result<InvocationOutcome>;

    /// Probe the remote agent's liveness endpoint.
    async fn health(&self) -> Result<()>;
}

/// Local natural-language response generator.
///
/// External collaborator: phrasing only. The delegator hands it either a
/// raw request (local answers) or a request plus a tool payload (formatting
/// a delegated result).
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, request: &str, tool_payload: Option<&Value>) -> Result<String>;
}
