//! Mock implementations of core traits for testing.
//!
//! Every network seam and the answer generator have a scripted mock here so
//! the bridging and routing logic can be exercised without sockets.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::traits::{AnswerGenerator, SkillTransport, Tool, ToolRegistry, ToolTransport};
use crate::types::{AgentCard, InvocationOutcome, ParameterSpec, ToolDescriptor};

// =============================================================================
// Mock Tool
// =============================================================================

type ToolHandler = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Configurable tool for registry tests.
pub struct MockTool {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    handler: ToolHandler,
}

impl MockTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Box::new(|args| Ok(args)),
        }
    }

    /// Replace the echo behavior with a custom handler.
    pub fn with_handler(
        mut self,
        handler: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// A tool that always fails at the handler level.
    pub fn failing(self, message: &str) -> Self {
        let message = message.to_string();
        self.with_handler(move |_| Err(Error::tool_execution(message.clone())))
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        self.parameters.clone()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        (self.handler)(args)
    }
}

// =============================================================================
// In-Process Tool Transport
// =============================================================================

/// `ToolTransport` backed directly by a local registry, bypassing HTTP.
///
/// Used to exercise the bridge against a real registry in-process.
pub struct RegistryToolTransport {
    registry: Arc<dyn ToolRegistry>,
}

impl RegistryToolTransport {
    pub fn new(registry: Arc<dyn ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolTransport for RegistryToolTransport {
    async fn fetch_catalog(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.registry.list().await)
    }

    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome {
        self.registry.invoke(name, args).await
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Flaky Tool Transport
// =============================================================================

/// Wraps a transport and fails the first N catalog fetches with transport
/// errors, for backoff and stale-cache tests.
pub struct FlakyToolTransport {
    inner: Arc<dyn ToolTransport>,
    failures_remaining: Mutex<u32>,
    fetch_calls: Mutex<usize>,
}

impl FlakyToolTransport {
    pub fn new(inner: Arc<dyn ToolTransport>, failures: u32) -> Self {
        Self {
            inner,
            failures_remaining: Mutex::new(failures),
            fetch_calls: Mutex::new(0),
        }
    }

    /// Number of catalog fetches attempted so far.
    pub fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock().unwrap()
    }

    /// Arm another round of failures.
    pub fn fail_next(&self, failures: u32) {
        *self.failures_remaining.lock().unwrap() = failures;
    }
}

#[async_trait]
impl ToolTransport for FlakyToolTransport {
    async fn fetch_catalog(&self) -> Result<Vec<ToolDescriptor>> {
        *self.fetch_calls.lock().unwrap() += 1;
        {
            let mut remaining = self.failures_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::transport("connection refused (scripted)"));
            }
        }
        self.inner.fetch_catalog().await
    }

    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome {
        self.inner.invoke(name, args).await
    }

    async fn health(&self) -> Result<()> {
        if *self.failures_remaining.lock().unwrap() > 0 {
            return Err(Error::transport("connection refused (scripted)"));
        }
        self.inner.health().await
    }
}

// =============================================================================
// Mock Skill Transport
// =============================================================================

/// Scripted remote agent for delegator tests.
pub struct MockSkillTransport {
    card: Mutex<AgentCard>,
    outcomes: Mutex<HashMap<String, InvocationOutcome>>,
    transport_failures: Mutex<u32>,
    invocations: Mutex<Vec<(String, Value)>>,
}

impl MockSkillTransport {
    pub fn new(card: AgentCard) -> Self {
        Self {
            card: Mutex::new(card),
            outcomes: Mutex::new(HashMap::new()),
            transport_failures: Mutex::new(0),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Script the outcome returned for a skill id.
    pub fn script_outcome(&self, skill_id: &str, outcome: InvocationOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(skill_id.to_string(), outcome);
    }

    /// Make the next N invocations fail at the transport level.
    pub fn fail_next_invocations(&self, failures: u32) {
        *self.transport_failures.lock().unwrap() = failures;
    }

    /// Replace the published card (simulates an upstream catalog change).
    pub fn set_card(&self, card: AgentCard) {
        *self.card.lock().unwrap() = card;
    }

    /// Invocations recorded so far, as (skill_id, arguments) pairs.
    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl SkillTransport for MockSkillTransport {
    async fn fetch_card(&self) -> Result<AgentCard> {
        Ok(self.card.lock().unwrap().clone())
    }

    async fn invoke_skill(&self, skill_id: &str, args: Value) -> Result<InvocationOutcome> {
        self.invocations
            .lock()
            .unwrap()
            .push((skill_id.to_string(), args));

        {
            let mut failures = self.transport_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Ok(InvocationOutcome::TransportError(
                    "connection reset (scripted)".to_string(),
                ));
            }
        }

        let known = self
            .card
            .lock()
            .unwrap()
            .skills
            .iter()
            .any(|s| s.id == skill_id);
        if !known {
            return Err(Error::skill_not_found(skill_id));
        }

        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .get(skill_id)
            .cloned()
            .unwrap_or_else(|| InvocationOutcome::Success(Value::Null)))
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Mock Answer Generator
// =============================================================================

/// Scripted answer generator.
pub struct MockAnswerGenerator {
    constant: Option<String>,
    fail: bool,
    calls: Mutex<usize>,
}

impl MockAnswerGenerator {
    /// Echoes the request and any tool payload into the answer, so tests can
    /// assert payload values survive formatting.
    pub fn echoing() -> Self {
        Self {
            constant: None,
            fail: false,
            calls: Mutex::new(0),
        }
    }

    /// Always returns the same answer.
    pub fn constant(answer: &str) -> Self {
        Self {
            constant: Some(answer.to_string()),
            fail: false,
            calls: Mutex::new(0),
        }
    }

    /// Always fails, to exercise the fallback-to-payload path.
    pub fn failing() -> Self {
        Self {
            constant: None,
            fail: true,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AnswerGenerator for MockAnswerGenerator {
    async fn generate(&self, request: &str, tool_payload: Option<&Value>) -> Result<String> {
        *self.calls.lock().unwrap() += 1;

        if self.fail {
            return Err(Error::Generation("scripted generator failure".into()));
        }
        if let Some(answer) = &self.constant {
            return Ok(answer.clone());
        }
        Ok(match tool_payload {
            Some(payload) => format!("{} -> {}", request, payload),
            None => format!("(local) {}", request),
        })
    }
}
