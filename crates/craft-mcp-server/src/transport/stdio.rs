//! stdio transport
//!
//! Newline-delimited JSON on stdin/stdout, one request in flight at a time.

use crate::McpServer;
use crate::dispatcher::handle_raw;
use crate::host::HostSession;
use crate::rpc::Response;
use craft_mcp_core::{McpError, Result, error_codes};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// Run the server on stdio
pub async fn run<H: HostSession>(server: Arc<McpServer<H>>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    info!("craft-mcp server starting on stdio");

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| McpError::TransportError(format!("Failed to read stdin: {}", e)))?;

        if bytes_read == 0 {
            info!("Client disconnected (EOF)");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let Some(response) = handle_raw(&server, trimmed).await else {
            // Notification: nothing to send
            continue;
        };

        let response_json = serialize_response(&response);
        debug!("Sending: {}", response_json);

        stdout
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| McpError::TransportError(format!("Failed to write stdout: {}", e)))?;
        stdout
            .write_all(b"\n")
            .await
            .map_err(|e| McpError::TransportError(format!("Failed to write newline: {}", e)))?;
        stdout
            .flush()
            .await
            .map_err(|e| McpError::TransportError(format!("Failed to flush stdout: {}", e)))?;
    }

    Ok(())
}

/// Serialize a response, degrading to a best-effort error envelope rather
/// than dropping the request on the floor.
pub(crate) fn serialize_response(response: &Response) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            let fallback = Response::error(
                response.id.clone(),
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize response: {}", e),
            );
            serde_json::to_string(&fallback)
                .unwrap_or_else(|_| r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"serialization failure"}}"#.to_string())
        }
    }
}
