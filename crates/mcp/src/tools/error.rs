// Tool failure taxonomy

use budgetkey_client::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a failed tool call, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller arguments were missing or malformed. No request was sent.
    ValidationError,
    /// Connection failure or timeout talking to the upstream API.
    NetworkError,
    /// Upstream answered with a non-2xx status or an unparseable body.
    UpstreamError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::NetworkError => "NetworkError",
            Self::UpstreamError => "UpstreamError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("missing required argument '{field}'")]
    MissingArgument { field: &'static str },

    #[error("argument '{field}' must not be empty")]
    EmptyArgument { field: &'static str },

    #[error("argument '{field}' must be {expected}")]
    InvalidArgument {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument { .. }
            | Self::EmptyArgument { .. }
            | Self::InvalidArgument { .. } => ErrorKind::ValidationError,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Upstream { .. } => ErrorKind::UpstreamError,
        }
    }
}

impl From<ClientError> for ToolError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, .. } => Self::Upstream {
                status: Some(status),
                message: err.to_string(),
            },
            ClientError::InvalidBody(_) => Self::Upstream {
                status: None,
                message: err.to_string(),
            },
            ClientError::Network { .. }
            | ClientError::Config(_)
            | ClientError::InvalidUrl(_)
            | ClientError::Client(_) => Self::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kinds() {
        assert_eq!(
            ToolError::MissingArgument { field: "dataset" }.kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            ToolError::InvalidArgument {
                field: "page_size",
                expected: "a positive integer"
            }
            .to_string(),
            "argument 'page_size' must be a positive integer"
        );
    }

    #[test]
    fn test_client_error_mapping() {
        let upstream: ToolError = ClientError::from_response(500, "").into();
        assert_eq!(upstream.kind(), ErrorKind::UpstreamError);
        assert!(upstream.to_string().contains("500"));

        let body: ToolError = ClientError::InvalidBody("expected value".to_string()).into();
        assert_eq!(body.kind(), ErrorKind::UpstreamError);

        let network: ToolError = ClientError::Network {
            url: "https://next.obudget.org/api/tables/x/info".to_string(),
            cause: "timed out after 30s".to_string(),
        }
        .into();
        assert_eq!(network.kind(), ErrorKind::NetworkError);
        assert!(network.to_string().contains("/api/tables/x/info"));
    }

    #[test]
    fn test_kind_serializes_by_name() {
        assert_eq!(
            serde_json::to_value(ErrorKind::NetworkError).unwrap(),
            serde_json::json!("NetworkError")
        );
    }
}
