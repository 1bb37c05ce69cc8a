//! Ollama-backed answer generator.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use skillbridge_core::{traits::AnswerGenerator, Error, Result};

const SYSTEM_PROMPT: &str = "You are a concise assistant. Answer in one or two \
    sentences of plain language. When given a tool result, state it directly \
    without mentioning tools or internal systems.";

/// `AnswerGenerator` backed by a local Ollama server's `/api/chat`.
///
/// Generation failures are reported as `Error::Generation`; the delegator
/// falls back to the raw tool payload, so a dead model never blocks an
/// answer.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(&self, request: &str, tool_payload: Option<&Value>) -> Result<String> {
        let user = match tool_payload {
            Some(payload) => format!(
                "The user asked: {}\nThe answer data is: {}\nPhrase a natural reply.",
                request, payload
            ),
            None => request.to_string(),
        };

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user},
            ],
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "chat returned HTTP {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("chat response unparseable: {}", e)))?;

        let answer = parsed.message.content.trim().to_string();
        if answer.is_empty() {
            return Err(Error::Generation("model returned an empty answer".to_string()));
        }
        Ok(answer)
    }
}
