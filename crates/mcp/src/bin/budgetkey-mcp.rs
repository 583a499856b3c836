// Standalone MCP server binary (stdio transport)

use anyhow::{Context, Result};
use budgetkey_client::{BudgetKeyClient, DEFAULT_API_BASE};
use budgetkey_mcp::stdio::serve_stdio;
use budgetkey_mcp::McpServer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let api_base =
        std::env::var("BUDGETKEY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

    tracing::info!("BudgetKey MCP server starting, upstream {}", api_base);

    let client = BudgetKeyClient::builder()
        .base_url(&api_base)
        .build()
        .with_context(|| format!("Invalid BUDGETKEY_API_BASE: {}", api_base))?;

    let server = McpServer::with_client(client);
    tracing::info!("Registered {} tools", server.registry().len());

    serve_stdio(Arc::new(server)).await?;

    Ok(())
}
