#![deny(unused)]
//! Bridge role for Skillbridge.
//!
//! Discovers a remote tool host's catalog over the MCP-style protocol,
//! translates every tool into a skill, and republishes the result as an
//! A2A-style agent. Invocations are proxied back to the originating tool.

pub mod catalog;
pub mod client;
pub mod server;
pub mod translate;

pub use catalog::{InProcessSkillTransport, SkillCatalog};
pub use client::HttpToolClient;
pub use server::{BridgeServer, BridgeServerConfig};
pub use translate::translate_catalog;
