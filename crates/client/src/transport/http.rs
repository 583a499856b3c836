//! HTTP transport layer for the BudgetKey client.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::request::UpstreamCall;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP transport for making API requests.
///
/// Cheap to clone; clones share one connection pool. Dropping an in-flight
/// [`HttpTransport::execute`] future aborts the request and releases its
/// connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a call, retrying network failures per the retry configuration.
    pub async fn execute(&self, call: &UpstreamCall) -> ClientResult<serde_json::Value> {
        let retry_config = &self.config.retry_config;
        let mut attempts = 0;

        loop {
            match self.execute_once(call).await {
                Err(e) if e.is_retryable() && attempts < retry_config.max_retries => {
                    let backoff = retry_config.backoff_for_attempt(attempts);
                    warn!(
                        url = %call.url(),
                        attempt = attempts + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Upstream request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempts += 1;
                }
                result => return result,
            }
        }
    }

    /// Issue exactly one GET for the call and classify the outcome.
    async fn execute_once(&self, call: &UpstreamCall) -> ClientResult<serde_json::Value> {
        let url = call.url().as_str();
        let started = Instant::now();

        let response = self
            .client
            .get(call.url().clone())
            .query(call.query_params())
            .timeout(call.timeout())
            .send()
            .await
            .map_err(|e| ClientError::from_transport(url, &e, call.timeout()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(url, &e, call.timeout()))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream response"
        );

        if !status.is_success() {
            return Err(ClientError::from_response(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidBody(e.to_string()))
    }
}
