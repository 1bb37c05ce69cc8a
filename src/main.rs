#![deny(unused)]
//! Skillbridge — tool/skill protocol bridging and request routing.
//!
//! One binary, three roles. The role is a config value; each role is a
//! self-contained network service:
//! - `toolhost`: tool registry behind an MCP-style HTTP surface
//! - `bridge`: republishes a tool host's catalog as an A2A agent
//! - `delegator`: consumer agent routing chat requests to remote skills

use std::sync::Arc;
use std::time::Duration;

use skillbridge_bridge::{BridgeServer, BridgeServerConfig, HttpToolClient, SkillCatalog};
use skillbridge_core::config::{AppConfig, Role};
use skillbridge_core::observability::configure_tracing;
use skillbridge_delegator::{
    Delegator, DelegatorServer, DelegatorServerConfig, HttpAgentClient, OllamaGenerator,
};
use skillbridge_toolhost::{default_registry, LeaveLedger, ToolhostServer, ToolhostServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configure_tracing();

    let config = AppConfig::load()?;
    tracing::info!(role = ?config.role, "Starting Skillbridge v{}", env!("CARGO_PKG_VERSION"));

    match config.role {
        Role::Toolhost => run_toolhost(config).await,
        Role::Bridge => run_bridge(config).await,
        Role::Delegator => run_delegator(config).await,
    }
}

async fn run_toolhost(config: AppConfig) -> anyhow::Result<()> {
    let ledger = Arc::new(LeaveLedger::seeded());
    let registry = Arc::new(default_registry(ledger).await?);

    let server_config = ToolhostServerConfig {
        host: config.toolhost.listen.host,
        port: config.toolhost.listen.port,
        name: config.toolhost.name,
        description: config.toolhost.description,
        ..ToolhostServerConfig::default()
    };

    ToolhostServer::new(server_config, registry).run().await?;
    Ok(())
}

async fn run_bridge(config: AppConfig) -> anyhow::Result<()> {
    let bridge = config.bridge;
    let timeout = Duration::from_millis(bridge.request_timeout_ms);

    let client = Arc::new(HttpToolClient::new(bridge.upstream.url(), timeout)?);
    let catalog = Arc::new(SkillCatalog::new(client, bridge.retry.clone()));

    // Wait for the tool host, then run the initial discovery. A failure
    // here is fatal: the bridge has no cached catalog to fall back on.
    catalog.wait_for_upstream().await?;
    catalog.refresh().await?;

    let server_config = BridgeServerConfig {
        host: bridge.listen.host.clone(),
        port: bridge.listen.port,
        name: bridge.name,
        description: bridge.description,
        endpoint: bridge.listen.url(),
        ..BridgeServerConfig::default()
    };

    BridgeServer::new(server_config, catalog).run().await?;
    Ok(())
}

async fn run_delegator(config: AppConfig) -> anyhow::Result<()> {
    let delegator_config = config.delegator;
    let timeout = Duration::from_millis(delegator_config.request_timeout_ms);

    let transport = Arc::new(HttpAgentClient::new(
        delegator_config.upstream.url(),
        timeout,
    )?);
    let generator = Arc::new(OllamaGenerator::new(
        delegator_config.generator_url.clone(),
        delegator_config.model.clone(),
        timeout,
    )?);

    let delegator = Arc::new(Delegator::new(
        transport,
        generator,
        delegator_config.entities.clone(),
        delegator_config.entity_params.clone(),
    ));

    // Bounded startup probing: retry discovery per the backoff policy
    // before giving up.
    let mut attempt = 0;
    loop {
        match delegator.refresh_index().await {
            Ok(()) => break,
            Err(err) if attempt + 1 < delegator_config.retry.max_attempts => {
                tracing::warn!(attempt, error = %err, "Upstream agent not ready, waiting");
                delegator_config.retry.wait(attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let server_config = DelegatorServerConfig {
        host: delegator_config.listen.host.clone(),
        port: delegator_config.listen.port,
        name: delegator_config.name,
        description: delegator_config.description,
        endpoint: delegator_config.listen.url(),
        ..DelegatorServerConfig::default()
    };

    DelegatorServer::new(server_config, delegator).run().await?;
    Ok(())
}
