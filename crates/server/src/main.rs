use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::{AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "budgetkey-server")]
#[command(about = "MCP server for the BudgetKey public budget datasets", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "budgetkey.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Base URL of the BudgetKey API (overrides the config file)
    #[arg(long, env = "BUDGETKEY_API_BASE")]
    api_base: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "BUDGETKEY_JSON_LOGS")]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "budgetkey_server=info,budgetkey_mcp=info,budgetkey_client=info,tower_http=debug".into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    if json {
        builder.json().init();
    } else {
        builder.with_file(true).with_line_number(true).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    tracing::info!("Starting BudgetKey MCP server");

    // Load configuration
    let config = ServerConfig::load(&args.config, args.api_base)?;
    tracing::info!("Upstream API: {}", config.upstream.base_url);

    let state = AppState::new(&config)?;
    tracing::info!("Registered {} tools", state.mcp.registry().len());

    let addr = format!("{}:{}", args.host, args.port);
    api::serve(&addr, state).await?;

    Ok(())
}
