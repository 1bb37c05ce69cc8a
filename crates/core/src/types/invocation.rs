use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Invocation Types
// =============================================================================

/// Tagged outcome of a tool or skill invocation.
///
/// The tag is carried end-to-end from the tool host through the bridge to
/// the delegator. A `ToolError` means the tool ran (or was rejected) and
/// logically failed; a `TransportError` means the network call around it
/// failed. The distinction drives the retry policy: transport failures are
/// retryable, in-band failures are not.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// The tool executed and produced a payload.
    Success(Value),
    /// The tool was rejected (unknown name, invalid arguments) or ran and
    /// logically failed.
    ToolError(String),
    /// The network call failed (connection refused, timeout, bad gateway).
    TransportError(String),
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload, if the invocation succeeded.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Wire envelope for invocation endpoints: `{status: "ok", result}` or
/// `{status: "error", message}`.
///
/// Transport-level failures never appear in this envelope; they surface as
/// HTTP-level failures and are mapped to `InvocationOutcome::TransportError`
/// by the calling side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationResponse {
    Ok { result: Value },
    Error { message: String },
}

impl InvocationResponse {
    /// Build the wire envelope for an in-band outcome.
    ///
    /// Must not be called with a `TransportError`; those are reported at the
    /// HTTP level, not in the envelope.
    pub fn from_outcome(outcome: &InvocationOutcome) -> Option<Self> {
        match outcome {
            InvocationOutcome::Success(value) => Some(Self::Ok {
                result: value.clone(),
            }),
            InvocationOutcome::ToolError(message) => Some(Self::Error {
                message: message.clone(),
            }),
            InvocationOutcome::TransportError(_) => None,
        }
    }

    /// Interpret a parsed envelope as an outcome.
    pub fn into_outcome(self) -> InvocationOutcome {
        match self {
            Self::Ok { result } => InvocationOutcome::Success(result),
            Self::Error { message } => InvocationOutcome::ToolError(message),
        }
    }
}
