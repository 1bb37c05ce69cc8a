use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Which of the three roles this process runs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Toolhost,
    Bridge,
    Delegator,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub role: Role,
    pub toolhost: ToolhostConfig,
    pub bridge: BridgeConfig,
    pub delegator: DelegatorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl ListenConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Location of the upstream service a dependent role talks to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub host: String,
    pub port: u16,
}

impl UpstreamConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolhostConfig {
    pub listen: ListenConfig,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BridgeConfig {
    pub listen: ListenConfig,
    /// The tool host this bridge republishes.
    pub upstream: UpstreamConfig,
    pub name: String,
    pub description: String,
    pub retry: RetryPolicy,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DelegatorConfig {
    pub listen: ListenConfig,
    /// The bridge agent this delegator consumes skills from.
    pub upstream: UpstreamConfig,
    pub name: String,
    pub description: String,
    pub retry: RetryPolicy,
    pub request_timeout_ms: u64,
    /// Behavior identifier for the local response generator.
    pub model: String,
    /// Base URL of the response generator service.
    pub generator_url: String,
    /// Known entity names usable as strong routing signals.
    pub entities: Vec<String>,
    /// Parameter names that accept an entity as their value.
    pub entity_params: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("SKILLBRIDGE_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__DELEGATOR__MODEL=... to delegator.model
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            role: Role::Toolhost,
            toolhost: ToolhostConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".into(),
                    port: 3000,
                },
                name: "Tool Host".into(),
                description: "Tool host providing common tools".into(),
            },
            bridge: BridgeConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".into(),
                    port: 8000,
                },
                upstream: UpstreamConfig {
                    host: "127.0.0.1".into(),
                    port: 3000,
                },
                name: "Tool Provider Agent".into(),
                description: "Agent republishing tool-host tools as skills".into(),
                retry: RetryPolicy::default(),
                request_timeout_ms: 10_000,
            },
            delegator: DelegatorConfig {
                listen: ListenConfig {
                    host: "127.0.0.1".into(),
                    port: 8001,
                },
                upstream: UpstreamConfig {
                    host: "127.0.0.1".into(),
                    port: 8000,
                },
                name: "Tool Consumer Agent".into(),
                description: "Agent delegating tool requests to a provider".into(),
                retry: RetryPolicy::default(),
                request_timeout_ms: 30_000,
                model: "llama3.1:8b".into(),
                generator_url: "http://localhost:11434".into(),
                entities: vec![
                    "Raghu".into(),
                    "Jake".into(),
                    "Corbin".into(),
                    "Steve".into(),
                ],
                entity_params: vec!["employee_id".into()],
            },
        }
    }
}
