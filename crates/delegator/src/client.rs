//! HTTP client for a remote A2A-style agent.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use skillbridge_core::{
    traits::SkillTransport,
    types::{AgentCard, InvocationOutcome, InvocationResponse},
    Error, Result,
};

/// `SkillTransport` over HTTP against an A2A-style agent.
///
/// A 404 from the invoke endpoint means the remote agent does not know the
/// skill id and comes back as `Err(SkillNotFound)`, the signal to re-run
/// discovery. All other network-level failures fold into the
/// `TransportError` outcome.
pub struct HttpAgentClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAgentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(context: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(format!("{}: request timed out", context))
    } else {
        Error::transport(format!("{}: {}", context, err))
    }
}

#[async_trait]
impl SkillTransport for HttpAgentClient {
    async fn fetch_card(&self) -> Result<AgentCard> {
        let response = self
            .client
            .get(self.url("/.well-known/agent.json"))
            .send()
            .await
            .map_err(|e| transport_error("card fetch failed", &e))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "card fetch returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<AgentCard>()
            .await
            .map_err(|e| transport_error("card unparseable", &e))
    }

    async fn invoke_skill(&self, skill_id: &str, args: Value) -> Result<InvocationOutcome> {
        let body = json!({ "skill_id": skill_id, "arguments": args });

        let response = match self
            .client
            .post(self.url("/skills/invoke"))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(InvocationOutcome::TransportError(
                    transport_error("skill invocation failed", &e).to_string(),
                ));
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::skill_not_found(skill_id));
        }

        if !response.status().is_success() {
            return Ok(InvocationOutcome::TransportError(format!(
                "skill invocation returned HTTP {}",
                response.status()
            )));
        }

        match response.json::<InvocationResponse>().await {
            Ok(envelope) => Ok(envelope.into_outcome()),
            Err(e) => Ok(InvocationOutcome::TransportError(format!(
                "invocation response unparseable: {}",
                e
            ))),
        }
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| transport_error("health probe failed", &e))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "health probe returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}
