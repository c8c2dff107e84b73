//! # craft-mcp-server
//!
//! MCP server exposing voxel-game automation tools.
//!
//! This crate provides:
//! - `HostSession` trait for bridging to a running game client
//! - The command execution pipeline (safety validation, feedback capture,
//!   outcome classification)
//! - JSON-RPC protocol handling and tool routing
//! - stdio, TCP, and HTTP transports

pub mod dispatcher;
pub mod executor;
pub mod feedback;
pub mod host;
pub mod rpc;
pub mod tools;
pub mod transport;

pub use executor::CommandExecutor;
pub use feedback::FeedbackCapture;
pub use host::{HostSession, ScreenshotParams};

use craft_mcp_core::McpConfig;
use std::sync::Arc;

/// MCP server bound to one host session
pub struct McpServer<H: HostSession> {
    host: Arc<H>,
    config: Arc<McpConfig>,
    executor: CommandExecutor,
}

impl<H: HostSession> McpServer<H> {
    pub fn new(host: H, config: McpConfig) -> Self {
        let executor = CommandExecutor::from_config(&config);
        Self {
            host: Arc::new(host),
            config: Arc::new(config),
            executor,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Run the server on stdio transport
    pub async fn run_stdio(self: Arc<Self>) -> craft_mcp_core::Result<()> {
        transport::stdio::run(self).await
    }

    /// Run the server on the newline-delimited TCP transport
    pub async fn run_tcp(self: Arc<Self>) -> craft_mcp_core::Result<()> {
        transport::tcp::run(self).await
    }

    /// Run the server on the HTTP transport
    pub async fn run_http(self: Arc<Self>) -> craft_mcp_core::Result<()> {
        transport::http::run(self).await
    }
}
