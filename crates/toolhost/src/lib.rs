#![deny(unused)]
//! Tool host role for Skillbridge.
//!
//! This crate provides:
//! - The in-memory tool registry with schema validation and handler isolation
//! - Built-in tools (weather, calculator, add_numbers)
//! - The employee leave ledger and its tools
//! - The MCP-style HTTP server publishing the catalog

pub mod builtin;
pub mod leave;
pub mod registry;
pub mod server;

pub use builtin::{AddNumbersTool, CalculateTool, GetWeatherTool};
pub use leave::{
    ApplyLeaveTool, GetLeaveBalanceTool, GetLeaveHistoryTool, LeaveLedger, ListEmployeesTool,
};
pub use registry::InMemoryToolRegistry;
pub use server::{ToolhostServer, ToolhostServerConfig};

use std::sync::Arc;

use skillbridge_core::Result;

/// Build a registry loaded with the full built-in tool set.
pub async fn default_registry(ledger: Arc<LeaveLedger>) -> Result<InMemoryToolRegistry> {
    use skillbridge_core::traits::ToolRegistry;

    let registry = InMemoryToolRegistry::new();
    registry.register(Box::new(GetWeatherTool)).await?;
    registry.register(Box::new(CalculateTool)).await?;
    registry.register(Box::new(AddNumbersTool)).await?;
    registry
        .register(Box::new(GetLeaveBalanceTool::new(ledger.clone())))
        .await?;
    registry
        .register(Box::new(ApplyLeaveTool::new(ledger.clone())))
        .await?;
    registry
        .register(Box::new(GetLeaveHistoryTool::new(ledger.clone())))
        .await?;
    registry
        .register(Box::new(ListEmployeesTool::new(ledger)))
        .await?;
    Ok(registry)
}
