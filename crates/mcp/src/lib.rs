// MCP (Model Context Protocol) server exposing the BudgetKey tables API
// as three tools: DatasetInfo, DatasetFullTextSearch and DatasetDBQuery.

pub mod catalog;
pub mod error;
pub mod instructions;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::McpServer;
