//! craft-mcp: standalone automation bridge
//!
//! Connects to the in-game automation socket, then serves the Model
//! Context Protocol on the configured transport (stdio, TCP, or HTTP).

use anyhow::Result;
use craft_mcp_client::RemoteHost;
use craft_mcp_core::McpConfig;
use craft_mcp_server::McpServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout may carry the protocol
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("craft-mcp.json"));
    let config = McpConfig::load_or_default(&config_path);

    info!(
        "Starting craft-mcp, game at {}:{}",
        config.client.game_host, config.client.game_port
    );

    let host = RemoteHost::connect(&config.client).await?;
    info!("Game link established, serving {} transport", config.server.transport);

    let transport = config.server.transport.clone();
    let server = Arc::new(McpServer::new(host, config));
    match transport.as_str() {
        "stdio" => server.run_stdio().await?,
        "tcp" => server.run_tcp().await?,
        "http" => server.run_http().await?,
        other => anyhow::bail!("Unknown transport in config: {}", other),
    }

    Ok(())
}
