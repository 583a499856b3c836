//! Error types for the BudgetKey client.

use serde::Deserialize;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Longest upstream error text carried into an error message.
const MAX_UPSTREAM_MESSAGE_CHARS: usize = 500;

/// Error types that can occur when calling the BudgetKey API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response: connect failure, timeout, or
    /// the connection dropped while reading the body.
    #[error("request to {url} failed: {cause}")]
    Network { url: String, cause: String },

    /// Upstream answered with a non-2xx status.
    #[error("upstream returned status {status}{}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },

    /// Upstream answered 2xx but the body is not JSON.
    #[error("upstream response body could not be parsed as JSON: {0}")]
    InvalidBody(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ClientError {
    /// Check if this error may be retried. Only network failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Classify a reqwest failure for the given target URL.
    pub fn from_transport(url: &str, err: &reqwest::Error, timeout: std::time::Duration) -> Self {
        let cause = if err.is_timeout() {
            format!("timed out after {}s", timeout.as_secs_f64())
        } else if err.is_connect() {
            format!("connection failed ({})", root_cause(err))
        } else if err.is_body() || err.is_decode() {
            format!("failed to read response body ({})", root_cause(err))
        } else {
            root_cause(err)
        };

        Self::Network {
            url: url.to_string(),
            cause,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .map(truncate_message);

        Self::Api { status, message }
    }
}

/// Error fields the upstream API is known to use.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
    message: Option<serde_json::Value>,
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        [self.error, self.message, self.detail]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

fn truncate_message(message: String) -> String {
    if message.chars().count() <= MAX_UPSTREAM_MESSAGE_CHARS {
        return message;
    }
    let mut truncated: String = message.chars().take(MAX_UPSTREAM_MESSAGE_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Innermost error text, without the URL reqwest prepends.
fn root_cause(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}
