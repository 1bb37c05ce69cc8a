//! Tool registry implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};

use skillbridge_core::{
    traits::{Tool, ToolRegistry},
    types::{InvocationOutcome, ParameterSpec, ToolDescriptor},
    Error, Result,
};

/// In-memory tool registry.
///
/// Lookup goes through a DashMap; a separate insertion-order list backs the
/// catalog so `list()` is stable across calls — catalog order is the final
/// routing tie-break downstream and must never depend on map iteration.
pub struct InMemoryToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
    order: RwLock<Vec<String>>,
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for InMemoryToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        tracing::info!(tool = %name, "Registering tool");

        if self.tools.contains_key(&name) {
            return Err(Error::internal(format!(
                "tool '{}' is already registered",
                name
            )));
        }

        self.tools.insert(name.clone(), Arc::from(tool));
        self.order.write().expect("order lock poisoned").push(name);
        Ok(())
    }

    async fn list(&self) -> Vec<ToolDescriptor> {
        let order = self.order.read().expect("order lock poisoned").clone();
        order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|entry| {
                ToolDescriptor::new(entry.name(), entry.description(), entry.parameters())
            })
            .collect()
    }

    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome {
        let tool = match self.tools.get(name) {
            Some(entry) => entry.value().clone(),
            None => {
                return InvocationOutcome::ToolError(Error::tool_not_found(name).to_string());
            }
        };

        if let Err(err) = validate_args(&tool.parameters(), &args) {
            tracing::debug!(tool = %name, error = %err, "Argument validation failed");
            return InvocationOutcome::ToolError(err.to_string());
        }

        tracing::debug!(tool = %name, "Executing tool");

        // The handler runs in its own task so a panic surfaces as a JoinError
        // instead of tearing down the caller.
        let task_name = name.to_string();
        match tokio::spawn(async move { tool.execute(args).await }).await {
            Ok(Ok(payload)) => InvocationOutcome::Success(payload),
            Ok(Err(err)) => InvocationOutcome::ToolError(err.to_string()),
            Err(join_err) => {
                tracing::error!(tool = %task_name, error = %join_err, "Tool task failed");
                InvocationOutcome::ToolError(format!("tool '{}' aborted abnormally", task_name))
            }
        }
    }
}

/// Validate arguments against a tool's declared parameters.
///
/// Required parameters must be present, types must be coercible, and
/// undeclared parameters are rejected with the offending name.
fn validate_args(params: &[ParameterSpec], args: &Value) -> Result<()> {
    let empty = serde_json::Map::new();
    let object = match args {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => return Err(Error::validation("arguments must be a JSON object")),
    };

    for param in params {
        match object.get(&param.name) {
            None if param.required => {
                return Err(Error::validation(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            Some(value) if !param.param_type.accepts(value) => {
                return Err(Error::validation(format!(
                    "parameter '{}' expects type {}",
                    param.name,
                    param.param_type.schema_name()
                )));
            }
            _ => {}
        }
    }

    for key in object.keys() {
        if !params.iter().any(|p| &p.name == key) {
            return Err(Error::validation(format!("unexpected parameter '{}'", key)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillbridge_core::mocks::MockTool;

    fn echo_tool() -> MockTool {
        MockTool::new(
            "echo",
            "Echoes the input back",
            vec![ParameterSpec::required_string("message", "The message")],
        )
    }

    #[tokio::test]
    async fn register_and_list_preserves_order() {
        let registry = InMemoryToolRegistry::new();

        registry.register(Box::new(echo_tool())).await.unwrap();
        registry
            .register(Box::new(MockTool::new("second", "Second tool", vec![])))
            .await
            .unwrap();

        let tools = registry.list().await;
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "echo");
        assert_eq!(tools[1].name, "second");

        // Stable across repeated calls.
        assert_eq!(registry.list().await, tools);
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Box::new(echo_tool())).await.unwrap();

        let result = registry.register(Box::new(echo_tool())).await;
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn invoke_unknown_tool() {
        let registry = InMemoryToolRegistry::new();

        let outcome = registry.invoke("nonexistent", json!({})).await;
        match outcome {
            InvocationOutcome::ToolError(message) => {
                assert!(message.contains("unknown tool"));
            }
            other => panic!("expected ToolError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invoke_validates_required_params() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Box::new(echo_tool())).await.unwrap();

        let outcome = registry.invoke("echo", json!({})).await;
        match outcome {
            InvocationOutcome::ToolError(message) => {
                assert!(message.contains("invalid arguments"));
                assert!(message.contains("message"));
            }
            other => panic!("expected ToolError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invoke_rejects_unexpected_params() {
        let registry = InMemoryToolRegistry::new();
        registry.register(Box::new(echo_tool())).await.unwrap();

        let outcome = registry
            .invoke("echo", json!({"message": "hi", "extra": 1}))
            .await;
        match outcome {
            InvocationOutcome::ToolError(message) => {
                assert!(message.contains("unexpected parameter 'extra'"));
            }
            other => panic!("expected ToolError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn handler_failure_is_contained() {
        let registry = InMemoryToolRegistry::new();
        registry
            .register(Box::new(
                MockTool::new("broken", "Always fails", vec![]).failing("out of cheese"),
            ))
            .await
            .unwrap();

        let outcome = registry.invoke("broken", json!({})).await;
        match outcome {
            InvocationOutcome::ToolError(message) => {
                assert!(message.contains("out of cheese"));
            }
            other => panic!("expected ToolError, got {:?}", other),
        }

        // Registry still serves other calls.
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn invoke_accepts_coercible_types() {
        let registry = InMemoryToolRegistry::new();
        registry
            .register(Box::new(MockTool::new(
                "typed",
                "Typed tool",
                vec![ParameterSpec::required_integer("count", "A count")],
            )))
            .await
            .unwrap();

        let outcome = registry.invoke("typed", json!({"count": "42"})).await;
        assert!(outcome.is_success());

        let outcome = registry.invoke("typed", json!({"count": "not a number"})).await;
        assert!(!outcome.is_success());
    }
}
