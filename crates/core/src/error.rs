//! Error types for Skillbridge.

use thiserror::Error;

/// Result type alias using Skillbridge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Skillbridge.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Tool Host Errors
    // =========================================================================
    #[error("invalid arguments: {0}")]
    Validation(String),

    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    // =========================================================================
    // Bridge Errors
    // =========================================================================
    #[error("no such skill: {0}")]
    SkillNotFound(String),

    #[error("skill catalog unavailable: {0}")]
    CatalogUnavailable(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timeout: {0}")]
    Timeout(String),

    // =========================================================================
    // Delegator Errors
    // =========================================================================
    #[error("answer generation failed: {0}")]
    Generation(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("server error: {0}")]
    Server(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a tool not found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a tool execution error.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a skill not found error.
    pub fn skill_not_found(id: impl Into<String>) -> Self {
        Self::SkillNotFound(id.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a network-level failure eligible for retry.
    ///
    /// In-band tool and validation failures are terminal; only transport
    /// and timeout errors are subject to the backoff policy.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}
