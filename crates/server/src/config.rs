use anyhow::{Context, Result};
use budgetkey_client::{BudgetKeyClient, RetryConfig, DEFAULT_API_BASE};
use budgetkey_mcp::McpServer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_query_timeout_secs() -> u64 {
    60
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            max_retries: 0,
            user_agent: None,
        }
    }
}

impl ServerConfig {
    /// Load the config file if it exists, otherwise use defaults. An explicit
    /// base URL (flag or `BUDGETKEY_API_BASE`) overrides the file.
    pub fn load(config_path: &Path, api_base: Option<String>) -> Result<Self> {
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        if let Some(base_url) = api_base {
            config.upstream.base_url = base_url;
        }

        Ok(config)
    }

    /// Build the upstream client described by this configuration.
    pub fn build_client(&self) -> Result<BudgetKeyClient> {
        let upstream = &self.upstream;
        let mut builder = BudgetKeyClient::builder()
            .base_url(&upstream.base_url)
            .timeout(Duration::from_secs(upstream.timeout_secs))
            .query_timeout(Duration::from_secs(upstream.query_timeout_secs))
            .retry_config(RetryConfig::with_max_retries(upstream.max_retries));

        if let Some(user_agent) = &upstream.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .with_context(|| format!("Invalid upstream base URL: {}", upstream.base_url))
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self::from_server(McpServer::with_client(client)))
    }

    pub fn from_server(server: McpServer) -> Self {
        Self {
            mcp: Arc::new(server),
        }
    }
}
