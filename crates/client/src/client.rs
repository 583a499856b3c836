//! Main client for the BudgetKey API.

use crate::api::TablesApi;
use crate::config::{default_user_agent, ApiBase, ClientConfig, RetryConfig};
use crate::error::ClientResult;
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;

/// Main client for interacting with the BudgetKey API.
///
/// Holds no per-call state; clone it freely and share it across tasks.
#[derive(Debug, Clone)]
pub struct BudgetKeyClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl BudgetKeyClient {
    /// Create a new client builder.
    pub fn builder() -> BudgetKeyClientBuilder {
        BudgetKeyClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the tables API.
    pub fn tables(&self) -> TablesApi<'_> {
        TablesApi::new(self)
    }
}

/// Builder for creating a BudgetKeyClient.
pub struct BudgetKeyClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    query_timeout: Duration,
    retry_config: RetryConfig,
    user_agent: String,
}

impl BudgetKeyClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
            user_agent: default_user_agent(),
        }
    }

    /// Set the base URL of the upstream API. Defaults to production.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the timeout for info and search calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout for SQL query calls.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<BudgetKeyClient> {
        let base_url = match self.base_url {
            Some(url) => ApiBase::parse(&url)?,
            None => ApiBase::default(),
        };

        let config = ClientConfig {
            base_url,
            timeout: self.timeout,
            query_timeout: self.query_timeout,
            retry_config: self.retry_config,
            user_agent: self.user_agent,
        };

        BudgetKeyClient::from_config(config)
    }
}

impl Default for BudgetKeyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
