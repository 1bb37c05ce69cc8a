use serde::{Deserialize, Serialize};

use super::tool::ParameterSpec;

// =============================================================================
// Skill Descriptor Types
// =============================================================================

/// Protocol marker published on agent cards.
pub const AGENT_PROTOCOL: &str = "a2a-1.0";

/// Descriptor for a skill as republished by the bridge.
///
/// A skill is the protocol-translated image of exactly one tool. The id is
/// derived directly from the tool name, which keeps translation stable and
/// idempotent across discovery cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Stable skill identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters, translated field-by-field from the tool schema.
    pub parameters: Vec<ParameterSpec>,
    /// Name of the originating tool on the upstream tool host.
    pub invocation_target: String,
}

/// Agent card published at the well-known discovery path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    /// Agent name.
    pub name: String,
    /// Agent description.
    pub description: String,
    /// URL where the agent is reachable.
    pub endpoint: String,
    /// Agent version.
    pub version: String,
    /// Protocol marker.
    pub protocol: String,
    /// Published skills, in catalog order.
    pub skills: Vec<SkillDescriptor>,
}

impl AgentCard {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        endpoint: impl Into<String>,
        skills: Vec<SkillDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            endpoint: endpoint.into(),
            version: "1.0.0".to_string(),
            protocol: AGENT_PROTOCOL.to_string(),
            skills,
        }
    }
}
