// Protocol-level errors. Tool execution failures are not errors at this
// layer: they travel back as CallToolResult with isError set.

use crate::protocol::JsonRpcError;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Unknown resource: {0}")]
    ResourceNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Self::Serialization(e) => JsonRpcError::invalid_params(e.to_string()),
            Self::InvalidParams(message) => JsonRpcError::invalid_params(message.clone()),
            Self::ToolNotFound(name) => JsonRpcError::invalid_params(format!("Unknown tool: {}", name))
                .with_data(serde_json::json!({ "tool": name })),
            Self::ResourceNotFound(uri) => {
                JsonRpcError::invalid_params(format!("Unknown resource: {}", uri))
                    .with_data(serde_json::json!({ "uri": uri }))
            }
            Self::Io(_) | Self::Internal(_) => JsonRpcError::internal_error(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_maps_to_invalid_params() {
        let err = McpError::ToolNotFound("DropTable".to_string()).to_jsonrpc_error();
        assert_eq!(err.code, -32602);
        assert_eq!(err.data.unwrap()["tool"], "DropTable");
    }

    #[test]
    fn test_internal_maps_to_internal_error() {
        let err = McpError::Internal("writer closed".to_string()).to_jsonrpc_error();
        assert_eq!(err.code, -32603);
    }
}
