// MCP server: JSON-RPC message handling over the tool registry.
// Transport-agnostic; see `stdio` and the HTTP server crate for framing.

use crate::catalog::{self, AVAILABLE_DATASETS_URI};
use crate::error::{McpError, McpResult};
use crate::instructions::{server_instructions, SERVER_NAME};
use crate::protocol::*;
use crate::tools::{dataset_registry, ToolRegistry};
use budgetkey_client::BudgetKeyClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct McpServer {
    registry: ToolRegistry,
    instructions: String,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            instructions: server_instructions(),
        }
    }

    /// Server exposing the dataset tools over the given upstream client.
    pub fn with_client(client: BudgetKeyClient) -> Self {
        Self::new(dataset_registry(client))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Decode one JSON-RPC message. On failure, returns the error response
    /// to send back.
    pub fn parse_message(&self, body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Failed to parse JSON-RPC message");
            JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error())
        })?;

        if value.is_array() {
            return Err(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Batch requests are not supported"})),
            ));
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
            JsonRpcResponse::error(
                id.clone(),
                JsonRpcError::invalid_request().with_data(serde_json::json!({"message": e.to_string()})),
            )
        })?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Err(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request()
                    .with_data(serde_json::json!({"message": "Invalid JSON-RPC version"})),
            ));
        }

        Ok(request)
    }

    /// Parse and handle one message. `None` for notifications.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        match self.parse_message(body) {
            Ok(request) => self.handle_request(request).await,
            Err(response) => Some(response),
        }
    }

    /// Handle a decoded request. `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        debug!(method = %request.method, "Processing request");

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(DispatchError::MethodNotFound) => {
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method))
            }
            Err(DispatchError::Mcp(e)) => {
                warn!(method = %request.method, error = %e, "Request failed");
                JsonRpcResponse::error(id, e.to_jsonrpc_error())
            }
        };

        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            NOTIFICATION_INITIALIZED => info!("Client initialized"),
            NOTIFICATION_CANCELLED => debug!(params = ?request.params, "Client cancelled a request"),
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, DispatchError> {
        let result = match method {
            METHOD_INITIALIZE => self.handle_initialize(params)?,
            METHOD_PING => serde_json::json!({}),
            METHOD_TOOLS_LIST => self.handle_tools_list()?,
            METHOD_TOOLS_CALL => self.handle_tools_call(params).await?,
            METHOD_RESOURCES_LIST => self.handle_resources_list()?,
            METHOD_RESOURCES_READ => self.handle_resources_read(params)?,
            _ => return Err(DispatchError::MethodNotFound),
        };
        Ok(result)
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let protocol_version = match params {
            Some(params) => {
                let params: InitializeParams = serde_json::from_value(params)?;
                if let Some(client) = &params.client_info {
                    info!(client = %client.name, version = %client.version, "Client connecting");
                }
                negotiate_protocol_version(&params.protocol_version)
            }
            None => LATEST_PROTOCOL_VERSION,
        };

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(self.instructions.clone()),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params: CallToolParams = required_params(METHOD_TOOLS_CALL, params)?;
        let started = Instant::now();

        let result = self
            .registry
            .dispatch(&params.name, params.arguments)
            .await
            .ok_or_else(|| McpError::ToolNotFound(params.name.clone()))?;

        info!(
            tool = %params.name,
            success = result.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );

        Ok(serde_json::to_value(result.into_call_result())?)
    }

    fn handle_resources_list(&self) -> McpResult<Value> {
        let result = ListResourcesResult {
            resources: vec![Resource {
                uri: AVAILABLE_DATASETS_URI.to_string(),
                name: "available_datasets".to_string(),
                description: Some("Dataset ids accepted by the BudgetKey tools".to_string()),
                mime_type: Some("application/json".to_string()),
            }],
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_resources_read(&self, params: Option<Value>) -> McpResult<Value> {
        let params: ReadResourceParams = required_params(METHOD_RESOURCES_READ, params)?;
        if params.uri != AVAILABLE_DATASETS_URI {
            return Err(McpError::ResourceNotFound(params.uri));
        }

        let result = ReadResourceResult {
            contents: vec![ResourceContents {
                uri: params.uri,
                mime_type: Some("application/json".to_string()),
                text: serde_json::to_string_pretty(&catalog::catalog_json())?,
            }],
        };
        Ok(serde_json::to_value(result)?)
    }
}

enum DispatchError {
    MethodNotFound,
    Mcp(McpError),
}

impl From<McpError> for DispatchError {
    fn from(err: McpError) -> Self {
        Self::Mcp(err)
    }
}

fn required_params<T: DeserializeOwned>(method: &str, params: Option<Value>) -> McpResult<T> {
    let params =
        params.ok_or_else(|| McpError::InvalidParams(format!("Missing params for {}", method)))?;
    serde_json::from_value(params)
        .map_err(|e| McpError::InvalidParams(format!("Invalid params for {}: {}", method, e)))
}
