//! Request handling: classify, delegate, contain failures.
//!
//! `handle` is the failure-containment boundary. Whatever happens
//! downstream, the caller gets a natural-language answer: tool-level
//! failures become a plain statement of the reason, transport failures are
//! retried once and then degrade to an apology, and a dead generator falls
//! back to the raw tool payload.

use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

use skillbridge_core::{
    traits::{AnswerGenerator, SkillTransport},
    types::{FinalAnswer, IncomingRequest, InvocationOutcome, RoutingDecision, SkillDescriptor},
    Error, Result,
};

use crate::index::ClassificationIndex;

const LOCAL_FALLBACK: &str = "I'm sorry, I can't help with that right now.";
const TRANSPORT_APOLOGY: &str =
    "I couldn't reach the service that handles this just now. Please try again in a moment.";

pub struct Delegator {
    transport: Arc<dyn SkillTransport>,
    generator: Arc<dyn AnswerGenerator>,
    index: RwLock<ClassificationIndex>,
    entities: Vec<String>,
    entity_params: Vec<String>,
}

impl Delegator {
    pub fn new(
        transport: Arc<dyn SkillTransport>,
        generator: Arc<dyn AnswerGenerator>,
        entities: Vec<String>,
        entity_params: Vec<String>,
    ) -> Self {
        Self {
            transport,
            generator,
            index: RwLock::new(ClassificationIndex::empty()),
            entities,
            entity_params,
        }
    }

    /// Fetch the remote agent card and build the classification index.
    pub async fn refresh_index(&self) -> Result<()> {
        let card = self.transport.fetch_card().await?;
        tracing::info!(agent = %card.name, skills = card.skills.len(), "Discovered agent card");

        let index = ClassificationIndex::build(card.skills, &self.entities, &self.entity_params);
        *self.index.write().expect("index lock poisoned") = index;
        Ok(())
    }

    /// The skills currently known to the index, in catalog order.
    pub fn known_skills(&self) -> Vec<SkillDescriptor> {
        self.index
            .read()
            .expect("index lock poisoned")
            .skills()
            .to_vec()
    }

    /// Handle one request end to end, producing the final answer.
    pub async fn handle(&self, trace_id: &str, request: &IncomingRequest) -> FinalAnswer {
        let decision = self
            .index
            .read()
            .expect("index lock poisoned")
            .classify(request);

        match decision {
            RoutingDecision::Local => {
                tracing::debug!(trace_id = %trace_id, "Answering locally");
                self.local_answer(trace_id, request).await
            }
            RoutingDecision::Delegate { skill_id, arguments } => {
                tracing::info!(trace_id = %trace_id, skill = %skill_id, "Delegating");
                self.delegate(trace_id, request, &skill_id, arguments).await
            }
        }
    }

    async fn local_answer(&self, trace_id: &str, request: &IncomingRequest) -> FinalAnswer {
        let answer = match self.generator.generate(&request.message, None).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(trace_id = %trace_id, error = %err, "Local generation failed");
                LOCAL_FALLBACK.to_string()
            }
        };

        FinalAnswer {
            trace_id: trace_id.to_string(),
            answer,
            delegated: false,
            skill_id: None,
        }
    }

    async fn delegate(
        &self,
        trace_id: &str,
        request: &IncomingRequest,
        skill_id: &str,
        arguments: Map<String, Value>,
    ) -> FinalAnswer {
        let args = Value::Object(arguments);

        let outcome = match self.invoke_with_recovery(trace_id, skill_id, &args).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // The skill vanished even after re-discovery, or the remote
                // agent rejected the call outright. Answer locally.
                tracing::warn!(trace_id = %trace_id, skill = %skill_id, error = %err, "Delegation abandoned");
                return self.local_answer(trace_id, request).await;
            }
        };

        let answer = match outcome {
            InvocationOutcome::Success(payload) => self.format_success(trace_id, request, &payload).await,
            InvocationOutcome::ToolError(message) => {
                format!("I couldn't complete that: {}", message)
            }
            InvocationOutcome::TransportError(cause) => {
                tracing::warn!(trace_id = %trace_id, skill = %skill_id, cause = %cause, "Transport failure contained");
                TRANSPORT_APOLOGY.to_string()
            }
        };

        FinalAnswer {
            trace_id: trace_id.to_string(),
            answer,
            delegated: true,
            skill_id: Some(skill_id.to_string()),
        }
    }

    /// Invoke the skill, recovering once from each failure class: an
    /// unknown skill id triggers re-discovery and one retry; a transport
    /// outcome gets one retry before it is surfaced for containment.
    async fn invoke_with_recovery(
        &self,
        trace_id: &str,
        skill_id: &str,
        args: &Value,
    ) -> Result<InvocationOutcome> {
        let outcome = match self.transport.invoke_skill(skill_id, args.clone()).await {
            Ok(outcome) => outcome,
            Err(Error::SkillNotFound(_)) => {
                tracing::info!(trace_id = %trace_id, skill = %skill_id, "Skill unknown upstream, re-running discovery");
                self.refresh_index().await?;
                self.transport.invoke_skill(skill_id, args.clone()).await?
            }
            Err(err) => return Err(err),
        };

        match outcome {
            InvocationOutcome::TransportError(cause) => {
                tracing::warn!(trace_id = %trace_id, skill = %skill_id, cause = %cause, "Transport failure, retrying once");
                self.transport.invoke_skill(skill_id, args.clone()).await
            }
            outcome => Ok(outcome),
        }
    }

    async fn format_success(
        &self,
        trace_id: &str,
        request: &IncomingRequest,
        payload: &Value,
    ) -> String {
        match self.generator.generate(&request.message, Some(payload)).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(trace_id = %trace_id, error = %err, "Formatting failed, falling back to payload");
                payload_fallback(payload)
            }
        }
    }
}

/// Render a tool payload without the generator: prefer an embedded
/// human-readable message, otherwise the JSON itself.
fn payload_fallback(payload: &Value) -> String {
    payload
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
        .unwrap_or_else(|| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillbridge_core::mocks::{MockAnswerGenerator, MockSkillTransport};
    use skillbridge_core::types::{AgentCard, ParameterSpec};

    fn sample_card() -> AgentCard {
        AgentCard::new(
            "bridge",
            "Skill bridge",
            "http://localhost:8000",
            vec![
                SkillDescriptor {
                    id: "add_numbers".to_string(),
                    name: "add_numbers".to_string(),
                    description: "Add two numbers together".to_string(),
                    parameters: vec![
                        ParameterSpec::required_integer("a", "First number"),
                        ParameterSpec::required_integer("b", "Second number"),
                    ],
                    invocation_target: "add_numbers".to_string(),
                },
                SkillDescriptor {
                    id: "get_leave_balance".to_string(),
                    name: "get_leave_balance".to_string(),
                    description: "Check how many leave days are remaining".to_string(),
                    parameters: vec![ParameterSpec::required_string("employee_id", "Employee")],
                    invocation_target: "get_leave_balance".to_string(),
                },
            ],
        )
    }

    fn delegator(
        transport: Arc<MockSkillTransport>,
        generator: Arc<MockAnswerGenerator>,
    ) -> Delegator {
        Delegator::new(
            transport,
            generator,
            vec!["Raghu".to_string()],
            vec!["employee_id".to_string()],
        )
    }

    #[tokio::test]
    async fn success_is_formatted_by_the_generator() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        transport.script_outcome("add_numbers", InvocationOutcome::Success(json!(7)));
        let generator = Arc::new(MockAnswerGenerator::echoing());

        let delegator = delegator(transport.clone(), generator);
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle("t-1", &IncomingRequest::text("please add 3 and 4"))
            .await;

        assert!(answer.delegated);
        assert_eq!(answer.skill_id.as_deref(), Some("add_numbers"));
        assert!(answer.answer.contains('7'));

        let invocations = transport.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].1, json!({"a": 3, "b": 4}));
    }

    #[tokio::test]
    async fn unmatched_request_is_answered_locally() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        let generator = Arc::new(MockAnswerGenerator::constant("just chatting"));

        let delegator = delegator(transport.clone(), generator);
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle("t-2", &IncomingRequest::text("tell me a joke"))
            .await;

        assert!(!answer.delegated);
        assert_eq!(answer.answer, "just chatting");
        assert!(transport.invocations().is_empty());
    }

    #[tokio::test]
    async fn tool_error_becomes_a_plain_statement() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        transport.script_outcome(
            "get_leave_balance",
            InvocationOutcome::ToolError("employee not found: Zoe".to_string()),
        );
        let generator = Arc::new(MockAnswerGenerator::echoing());

        let delegator = delegator(transport, generator.clone());
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle(
                "t-3",
                &IncomingRequest::text("leave balance please").with_entity("Zoe"),
            )
            .await;

        assert!(answer.delegated);
        assert!(answer.answer.contains("employee not found: Zoe"));
        // The generator never sees failures.
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_retried_then_contained() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        transport.fail_next_invocations(2);
        let generator = Arc::new(MockAnswerGenerator::echoing());

        let delegator = delegator(transport.clone(), generator);
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle("t-4", &IncomingRequest::text("add 1 and 2"))
            .await;

        // One retry happened, then containment.
        assert_eq!(transport.invocations().len(), 2);
        assert!(answer.delegated);
        assert!(!answer.answer.is_empty());
        assert!(!answer.answer.contains("connection"));
        assert!(!answer.answer.contains("scripted"));
    }

    #[tokio::test]
    async fn transport_blip_recovers_on_the_retry() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        transport.fail_next_invocations(1);
        transport.script_outcome("add_numbers", InvocationOutcome::Success(json!(3)));
        let generator = Arc::new(MockAnswerGenerator::echoing());

        let delegator = delegator(transport.clone(), generator);
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle("t-5", &IncomingRequest::text("add 1 and 2"))
            .await;

        assert_eq!(transport.invocations().len(), 2);
        assert!(answer.answer.contains('3'));
    }

    #[tokio::test]
    async fn unknown_skill_triggers_rediscovery() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        let generator = Arc::new(MockAnswerGenerator::echoing());

        let delegator = delegator(transport.clone(), generator);
        delegator.refresh_index().await.unwrap();

        // Upstream forgets the skill after we built our index.
        let mut shrunk = sample_card();
        shrunk.skills.retain(|s| s.id != "add_numbers");
        transport.set_card(shrunk);

        let answer = delegator
            .handle("t-6", &IncomingRequest::text("please add 3 and 4"))
            .await;

        // Discovery re-ran: the rebuilt index no longer lists the skill.
        assert_eq!(delegator.known_skills().len(), 1);
        // And the user still got an answer, not a protocol error.
        assert!(!answer.answer.is_empty());
        assert!(!answer.answer.contains("no such skill"));
    }

    #[tokio::test]
    async fn dead_generator_falls_back_to_payload_message() {
        let transport = Arc::new(MockSkillTransport::new(sample_card()));
        transport.script_outcome(
            "get_leave_balance",
            InvocationOutcome::Success(json!({
                "employee_id": "Raghu",
                "balance": 18,
                "message": "Raghu has 18 leave days remaining.",
            })),
        );
        let generator = Arc::new(MockAnswerGenerator::failing());

        let delegator = delegator(transport, generator);
        delegator.refresh_index().await.unwrap();

        let answer = delegator
            .handle("t-7", &IncomingRequest::text("how many leave days does Raghu have"))
            .await;

        assert_eq!(answer.answer, "Raghu has 18 leave days remaining.");
    }
}
