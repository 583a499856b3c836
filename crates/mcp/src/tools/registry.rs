// Tool registry and dispatch

use super::error::ToolError;
use super::result::ToolResult;
use crate::protocol::ToolSchema;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments, returning the upstream payload
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Tool registry for managing available tools.
///
/// Immutable once built; concurrent dispatches share nothing mutable.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas in registration order
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name. Every failure is folded into the result;
    /// `None` only when no such tool is registered.
    pub async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> Option<ToolResult> {
        let tool = self.get(name)?;

        debug!(tool = name, "Dispatching tool call");
        let result = ToolResult::from(tool.execute(arguments).await);

        if let ToolResult::Failure { kind, message } = &result {
            warn!(tool = name, kind = %kind, error = %message, "Tool call failed");
        }

        Some(result)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description,
        "minLength": 1
    })
}

pub fn json_schema_positive_integer(description: &str, default: u32) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "description": description,
        "minimum": 1,
        "default": default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTool {
        name: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.to_string(),
                description: "echo".to_string(),
                input_schema: json_schema_object(serde_json::json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if arguments.is_null() {
                return Err(ToolError::MissingArgument { field: "dataset" });
            }
            Ok(arguments)
        }
    }

    fn echo(name: &'static str) -> Arc<EchoTool> {
        Arc::new(EchoTool {
            name,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_register_keeps_order_and_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("b"));
        registry.register(echo("a"));
        registry.register(echo("b"));

        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
    }

    #[tokio::test]
    async fn test_dispatch_folds_errors_into_result() {
        let tool = echo("echo");
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone());

        let ok = registry.dispatch("echo", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(ok, ToolResult::success(serde_json::json!({"a": 1})));

        let failed = registry.dispatch("echo", serde_json::Value::Null).await.unwrap();
        match failed {
            ToolResult::Failure { kind, .. } => assert_eq!(kind, ErrorKind::ValidationError),
            other => panic!("Expected failure, got {:?}", other),
        }

        assert!(registry.dispatch("missing", serde_json::json!({})).await.is_none());
        assert_eq!(tool.calls.load(Ordering::SeqCst), 2);
    }
}
