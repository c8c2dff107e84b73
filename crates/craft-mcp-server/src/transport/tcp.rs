//! Raw socket transport
//!
//! Newline-delimited JSON over TCP, one task per connection. Requests on a
//! single connection are handled in order; separate connections proceed
//! independently.

use crate::McpServer;
use crate::dispatcher::handle_raw;
use crate::host::HostSession;
use crate::transport::stdio::serialize_response;
use craft_mcp_core::{McpError, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

/// Run the server on the TCP socket transport
pub async fn run<H: HostSession>(server: Arc<McpServer<H>>) -> Result<()> {
    let addr = format!(
        "{}:{}",
        server.config().server.host,
        server.config().server.tcp_port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| McpError::TransportError(format!("Failed to bind {}: {}", addr, e)))?;

    info!("craft-mcp server listening on tcp://{}", addr);

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| McpError::TransportError(format!("Accept failed: {}", e)))?;

        info!("Client connected from {}", peer);
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(server, stream).await {
                error!("Connection error: {}", e);
            }
            debug!("Client {} disconnected", peer);
        });
    }
}

async fn handle_connection<H: HostSession>(
    server: Arc<McpServer<H>>,
    stream: TcpStream,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| McpError::TransportError(format!("Read failed: {}", e)))?;
        if bytes_read == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);
        let Some(response) = handle_raw(&server, trimmed).await else {
            continue;
        };

        let response_json = serialize_response(&response);
        write_half
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| McpError::TransportError(format!("Write failed: {}", e)))?;
        write_half
            .write_all(b"\n")
            .await
            .map_err(|e| McpError::TransportError(format!("Write failed: {}", e)))?;
        write_half
            .flush()
            .await
            .map_err(|e| McpError::TransportError(format!("Flush failed: {}", e)))?;
    }
}
