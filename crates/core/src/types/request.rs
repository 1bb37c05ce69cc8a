use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Routing Types
// =============================================================================

/// A free-form incoming request with optional structured hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingRequest {
    /// Free-form request text.
    pub message: String,
    /// Caller-supplied entity hint (e.g. an employee name), treated as a
    /// strong routing signal when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl IncomingRequest {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

/// Decision produced by classification: delegate to a remote skill or
/// answer locally. Exactly one of the two holds for any request.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingDecision {
    /// Invoke the named remote skill with arguments extracted from the
    /// request.
    Delegate {
        skill_id: String,
        arguments: Map<String, Value>,
    },
    /// Answer with the local response generator.
    Local,
}

impl RoutingDecision {
    pub fn is_delegate(&self) -> bool {
        matches!(self, Self::Delegate { .. })
    }
}

/// Final, user-facing answer produced by the delegator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// Trace id for the request.
    pub trace_id: String,
    /// Natural-language answer text. Never raw protocol error text.
    pub answer: String,
    /// Whether a remote skill was invoked.
    pub delegated: bool,
    /// The skill invoked, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
}
