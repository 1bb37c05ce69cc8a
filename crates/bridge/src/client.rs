//! HTTP client for a remote tool host.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use skillbridge_core::{
    traits::ToolTransport,
    types::{InvocationOutcome, InvocationResponse, ToolDescriptor},
    Error, Result,
};

/// `ToolTransport` over HTTP against an MCP-style tool host.
///
/// Catalog and health failures come back as `Err(Transport)`; invocation
/// failures are folded into the outcome so the caller always gets a tag.
pub struct HttpToolClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpToolClient {
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
impl ToolTransport for HttpToolClient {
    async fn fetch_catalog(&self) -> Result<Vec<ToolDescriptor>> {
        let response = self
            .client
            .get(self.url("/tools"))
            .send()
            .await
            .map_err(|e| transport_error("catalog fetch failed", &e))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "catalog fetch returned HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error("catalog body unreadable", &e))?;

        let entries = body
            .get("tools")
            .and_then(|t| t.as_array())
            .ok_or_else(|| Error::transport("catalog document missing 'tools' array"))?;

        let catalog = entries
            .iter()
            .map(|entry| {
                ToolDescriptor::from_wire(
                    entry.get("name").and_then(|n| n.as_str()).unwrap_or_default(),
                    entry
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default(),
                    entry.get("parameters").unwrap_or(&Value::Null),
                )
            })
            .collect();

        Ok(catalog)
    }

    async fn invoke(&self, name: &str, args: Value) -> InvocationOutcome {
        let body = json!({ "name": name, "parameters": args });

        let response = match self
            .client
            .post(self.url("/execute"))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return InvocationOutcome::TransportError(
                    transport_error("execute call failed", &e).to_string(),
                );
            }
        };

        if !response.status().is_success() {
            return InvocationOutcome::TransportError(format!(
                "execute returned HTTP {}",
                response.status()
            ));
        }

        match response.json::<InvocationResponse>().await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => InvocationOutcome::TransportError(format!(
                "execute response unparseable: {}",
                e
            )),
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
