// Response normalization: tool outcomes into the MCP result envelope.

use super::error::{ErrorKind, ToolError};
use crate::protocol::{CallToolResult, ToolContent};
use serde::{Deserialize, Serialize};

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult {
    /// Upstream payload, passed through unchanged.
    Success { payload: serde_json::Value },
    /// Classified failure. The message never carries internal error chains.
    Failure { kind: ErrorKind, message: String },
}

impl ToolResult {
    pub fn success(payload: serde_json::Value) -> Self {
        Self::Success { payload }
    }

    pub fn failure(error: &ToolError) -> Self {
        Self::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Shape into the protocol envelope.
    ///
    /// Success carries the payload as compact JSON text, plus structured
    /// content when the payload is an object. Failure carries a
    /// `"<Kind>: <message>"` line and an `error` object, with `isError` set.
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            Self::Success { payload } => {
                let text = payload.to_string();
                let structured_content = payload.is_object().then_some(payload);
                CallToolResult {
                    content: vec![ToolContent::text(text)],
                    structured_content,
                    is_error: None,
                }
            }
            Self::Failure { kind, message } => CallToolResult {
                content: vec![ToolContent::text(format!("{}: {}", kind, message))],
                structured_content: Some(serde_json::json!({
                    "error": { "kind": kind, "message": message }
                })),
                is_error: Some(true),
            },
        }
    }
}

impl From<Result<serde_json::Value, ToolError>> for ToolResult {
    fn from(outcome: Result<serde_json::Value, ToolError>) -> Self {
        match outcome {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_passes_payload_through() {
        let payload = json!({"columns": ["year", "title"]});
        let result = ToolResult::success(payload.clone()).into_call_result();

        assert_eq!(result.is_error, None);
        assert_eq!(result.structured_content, Some(payload.clone()));
        let text = result.content[0].as_text();
        assert_eq!(serde_json::from_str::<serde_json::Value>(text).unwrap(), payload);
    }

    #[test]
    fn test_non_object_payload_has_no_structured_content() {
        let result = ToolResult::success(json!([1, 2, 3])).into_call_result();
        assert_eq!(result.structured_content, None);
        assert_eq!(result.content[0].as_text(), "[1,2,3]");
    }

    #[test]
    fn test_failure_envelope() {
        let error = ToolError::Upstream {
            status: Some(500),
            message: "upstream returned status 500".to_string(),
        };
        let result = ToolResult::failure(&error).into_call_result();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.content[0].as_text(),
            "UpstreamError: upstream returned status 500"
        );
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error"]["kind"], "UpstreamError");
        assert_eq!(structured["error"]["message"], "upstream returned status 500");
    }

    #[test]
    fn test_tool_result_serializes_with_status_tag() {
        let value = serde_json::to_value(ToolResult::failure(&ToolError::MissingArgument {
            field: "dataset",
        }))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "status": "failure",
                "kind": "ValidationError",
                "message": "missing required argument 'dataset'"
            })
        );
    }
}
