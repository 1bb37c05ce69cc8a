//! Skill catalog: single-flight discovery with a stale-serving cache.
//!
//! Discovery runs at most once at a time. Callers that arrive while a
//! refresh is in flight wait on the same gate and observe its result via
//! the generation counter instead of launching their own fetch. A refresh
//! that fails after a previous success leaves the cached catalog in place
//! and flips the catalog into degraded mode, which is reported explicitly
//! and never served silently.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use skillbridge_core::{
    retry::RetryPolicy,
    traits::{SkillTransport, ToolTransport},
    types::{AgentCard, InvocationOutcome, SkillDescriptor},
    Error, Result,
};

use crate::translate::translate_catalog;

pub struct SkillCatalog {
    transport: Arc<dyn ToolTransport>,
    retry: RetryPolicy,
    skills: RwLock<Option<Vec<SkillDescriptor>>>,
    degraded: AtomicBool,
    generation: AtomicU64,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl SkillCatalog {
    pub fn new(transport: Arc<dyn ToolTransport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            skills: RwLock::new(None),
            degraded: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Run discovery: fetch the remote catalog with backoff, translate it,
    /// and swap in the new skill set.
    ///
    /// Concurrent callers collapse into one fetch: whoever holds the gate
    /// fetches, everyone else waits and then observes the advanced
    /// generation.
    pub async fn refresh(&self) -> Result<()> {
        let observed = self.generation.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            // A refresh completed while we waited for the gate.
            return Ok(());
        }

        match self.fetch_with_retry().await {
            Ok(tools) => {
                let skills = translate_catalog(&tools);
                tracing::info!(skills = skills.len(), "Skill catalog refreshed");
                *self.skills.write().expect("catalog lock poisoned") = Some(skills);
                self.degraded.store(false, Ordering::Release);
                self.generation.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            Err(err) => {
                if self.has_catalog() {
                    tracing::warn!(error = %err, "Discovery failed; serving stale catalog");
                    self.degraded.store(true, Ordering::Release);
                } else {
                    tracing::error!(error = %err, "Discovery failed with no cached catalog");
                }
                Err(err)
            }
        }
    }

    async fn fetch_with_retry(&self) -> Result<Vec<skillbridge_core::types::ToolDescriptor>> {
        let mut attempt = 0;
        loop {
            match self.transport.fetch_catalog().await {
                Ok(tools) => return Ok(tools),
                Err(err) if err.is_transport() && attempt + 1 < self.retry.max_attempts => {
                    tracing::warn!(attempt, error = %err, "Catalog fetch failed, backing off");
                    self.retry.wait(attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// The cached skill set, in catalog order.
    ///
    /// Fails with `CatalogUnavailable` if discovery has never succeeded.
    pub fn list_skills(&self) -> Result<Vec<SkillDescriptor>> {
        self.skills
            .read()
            .expect("catalog lock poisoned")
            .clone()
            .ok_or_else(|| Error::CatalogUnavailable("discovery has never succeeded".to_string()))
    }

    pub fn has_catalog(&self) -> bool {
        self.skills.read().expect("catalog lock poisoned").is_some()
    }

    /// Whether the cached catalog is stale (last refresh failed after a
    /// previous success).
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Completed refresh count; advances once per successful discovery.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Resolve a skill id back to the originating tool name.
    pub fn resolve(&self, skill_id: &str) -> Result<String> {
        let skills = self.list_skills()?;
        skills
            .iter()
            .find(|s| s.id == skill_id)
            .map(|s| s.invocation_target.clone())
            .ok_or_else(|| Error::skill_not_found(skill_id))
    }

    /// Invoke a skill by proxying to its originating tool.
    ///
    /// The outcome tag passes through unchanged. Transport-level outcomes
    /// are retried per the backoff policy before being surfaced; in-band
    /// tool errors are terminal.
    pub async fn invoke_skill(&self, skill_id: &str, args: Value) -> Result<InvocationOutcome> {
        let target = self.resolve(skill_id)?;

        let mut attempt = 0;
        loop {
            let outcome = self.transport.invoke(&target, args.clone()).await;
            match outcome {
                InvocationOutcome::TransportError(ref cause)
                    if attempt + 1 < self.retry.max_attempts =>
                {
                    tracing::warn!(
                        skill = %skill_id,
                        attempt,
                        cause = %cause,
                        "Invocation transport failure, backing off"
                    );
                    self.retry.wait(attempt).await;
                    attempt += 1;
                }
                outcome => return Ok(outcome),
            }
        }
    }

    /// Probe the upstream tool host, independent of the cached catalog.
    pub async fn upstream_health(&self) -> Result<()> {
        self.transport.health().await
    }

    /// Block until the upstream host answers its health probe, retrying
    /// with the backoff policy. Used at startup by dependent roles.
    pub async fn wait_for_upstream(&self) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.transport.health().await {
                Ok(()) => return Ok(()),
                Err(err) if attempt + 1 < self.retry.max_attempts => {
                    tracing::warn!(attempt, error = %err, "Upstream not ready, waiting");
                    self.retry.wait(attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// =============================================================================
// In-Process Skill Transport
// =============================================================================

/// `SkillTransport` backed directly by a local catalog, bypassing HTTP.
///
/// Lets a delegator run against a bridge in the same process, and system
/// tests exercise the full chain without sockets.
pub struct InProcessSkillTransport {
    catalog: Arc<SkillCatalog>,
    agent_name: String,
    agent_description: String,
}

impl InProcessSkillTransport {
    pub fn new(
        catalog: Arc<SkillCatalog>,
        agent_name: impl Into<String>,
        agent_description: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            agent_name: agent_name.into(),
            agent_description: agent_description.into(),
        }
    }
}

#[async_trait]
impl SkillTransport for InProcessSkillTransport {
    async fn fetch_card(&self) -> Result<AgentCard> {
        let skills = self.catalog.list_skills()?;
        Ok(AgentCard::new(
            self.agent_name.clone(),
            self.agent_description.clone(),
            "local://bridge",
            skills,
        ))
    }

    async fn invoke_skill(&self, skill_id: &str, args: Value) -> Result<InvocationOutcome> {
        self.catalog.invoke_skill(skill_id, args).await
    }

    async fn health(&self) -> Result<()> {
        self.catalog.upstream_health().await
    }
}
