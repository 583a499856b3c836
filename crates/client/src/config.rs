//! Configuration types for the BudgetKey client.

use crate::error::{ClientError, ClientResult};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Production BudgetKey API host.
pub const DEFAULT_API_BASE: &str = "https://next.obudget.org";

/// Validated base URL of the upstream API.
///
/// Only `http`/`https` URLs that can carry path segments are accepted, so
/// joining dataset paths onto it never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(Url);

impl ApiBase {
    /// Parse and validate a base URL.
    pub fn parse(input: &str) -> ClientResult<Self> {
        let url = Url::parse(input.trim())?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::Config(format!(
                "base URL must use http or https, got: {}",
                url.scheme()
            )));
        }

        if url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL cannot carry a path: {}",
                input
            )));
        }

        Ok(Self(url))
    }

    /// The underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Append path segments to the base, percent-encoding each one.
    pub fn join_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        // parse() rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl Default for ApiBase {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"))
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

/// Configuration for the BudgetKey client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the upstream API.
    pub base_url: ApiBase,
    /// Timeout for dataset info and search calls.
    pub timeout: Duration,
    /// Timeout for SQL query calls, which run longest upstream.
    pub query_timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
    /// User-Agent header sent upstream.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: ApiBase) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(ApiBase::default())
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("budgetkey-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for retry behavior.
///
/// Only network failures are ever retried. Upstream responses, successful or
/// not, end the call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self::default()
    }

    /// Create a configuration retrying network failures up to `max_retries` times.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        std::cmp::min(backoff, self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let config = RetryConfig::with_max_retries(3);

        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let config = RetryConfig {
            max_backoff: Duration::from_millis(500),
            ..RetryConfig::with_max_retries(20)
        };

        assert_eq!(config.backoff_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn test_retry_disabled_by_default() {
        assert_eq!(RetryConfig::default().max_retries, 0);
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.base_url.to_string(), DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.query_timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("budgetkey-client/"));
    }

    #[test]
    fn test_api_base_rejects_non_http() {
        assert!(matches!(
            ApiBase::parse("ftp://example.com"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ApiBase::parse("mailto:someone@example.com"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ApiBase::parse("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_join_segments_with_trailing_slash_and_prefix() {
        let base = ApiBase::parse("http://localhost:8080/").unwrap();
        let url = base.join_segments(["api", "tables", "x", "info"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/tables/x/info");

        let base = ApiBase::parse("http://localhost:8080/proxy/").unwrap();
        let url = base.join_segments(["api", "tables", "x", "info"]);
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/api/tables/x/info");
    }
}
