//! Tool catalog and tools/call routing
//!
//! Tool schemas are built from live configuration so clients see the
//! currently enforced limits (sanitized allow-list, area caps) rather than
//! compile-time constants.

use crate::McpServer;
use crate::host::{HostSession, ScreenshotParams};
use crate::rpc::{RequestId, Response};
use craft_mcp_core::{McpError, Result, VoxelPos, compress_blocks};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Tool definition for tools/list
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Build the tool catalog from the server's live configuration
pub fn list_tools<H: HostSession>(server: &McpServer<H>) -> Vec<ToolDef> {
    let allowed = server.executor().allowed_commands().join(", ");
    let max_area = server.config().server.max_area_size;

    vec![
        ToolDef {
            name: "execute_commands".into(),
            description: format!(
                "Execute one or more game commands sequentially. Allowed commands: {}",
                allowed
            ),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "commands": {
                        "type": "array",
                        "description": "Array of game commands to execute (without leading slash)",
                        "minItems": 1,
                        "items": { "type": "string" }
                    },
                    "validate_safety": {
                        "type": "boolean",
                        "description": "Whether to validate command safety (default: true)",
                        "default": true
                    }
                },
                "required": ["commands"]
            }),
        },
        ToolDef {
            name: "get_player_info".into(),
            description: "Get comprehensive player information: position, facing direction, \
                          health and food status, game mode, dimension and time info, and \
                          inventory details. Essential for accurate building placement."
                .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDef {
            name: "get_blocks_in_area".into(),
            description: format!(
                "Get all non-air blocks in a specified area, compressed into connected \
                 regions. Maximum area size per axis: {} blocks.",
                max_area
            ),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "from": {
                        "type": "object",
                        "description": "Starting position of the area to scan",
                        "properties": {
                            "x": { "type": "integer" },
                            "y": { "type": "integer" },
                            "z": { "type": "integer" }
                        },
                        "required": ["x", "y", "z"]
                    },
                    "to": {
                        "type": "object",
                        "description": "Ending position of the area to scan",
                        "properties": {
                            "x": { "type": "integer" },
                            "y": { "type": "integer" },
                            "z": { "type": "integer" }
                        },
                        "required": ["x", "y", "z"]
                    }
                },
                "required": ["from", "to"]
            }),
        },
        ToolDef {
            name: "take_screenshot".into(),
            description: "Capture a screenshot of the game view, optionally repositioning \
                          the camera first."
                .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "x": { "type": "number" },
                    "y": { "type": "number" },
                    "z": { "type": "number" },
                    "yaw": { "type": "number" },
                    "pitch": { "type": "number" }
                }
            }),
        },
    ]
}

/// Tool result in MCP content form
fn tool_result(text: impl Into<String>, is_error: bool) -> serde_json::Value {
    serde_json::json!({
        "isError": is_error,
        "content": [{ "type": "text", "text": text.into() }]
    })
}

#[derive(Debug, Deserialize)]
struct ExecuteCommandsParams {
    commands: Vec<String>,
    #[serde(default = "default_validate_safety")]
    validate_safety: bool,
}

fn default_validate_safety() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct BlocksInAreaParams {
    from: VoxelPos,
    to: VoxelPos,
}

/// Handle a tools/call request. Unknown tool names and tool failures become
/// structured error results, never protocol faults.
pub async fn handle_tool_call<H: HostSession>(
    server: &McpServer<H>,
    name: &str,
    arguments: serde_json::Value,
    id: Option<RequestId>,
) -> Response {
    let result = match name {
        "execute_commands" => handle_execute_commands(server, arguments).await,
        "get_player_info" => server.host().player_info().await.map(|v| v.to_string()),
        "get_blocks_in_area" => handle_blocks_in_area(server, arguments).await,
        "take_screenshot" => handle_take_screenshot(server, arguments).await,
        _ => {
            return Response::success(id, tool_result(format!("Unknown tool: {}", name), true));
        }
    };

    match result {
        Ok(text) => Response::success(id, tool_result(text, false)),
        Err(e) => {
            error!("Tool '{}' failed: {}", name, e);
            Response::success(id, tool_result(e.to_string(), true))
        }
    }
}

async fn handle_execute_commands<H: HostSession>(
    server: &McpServer<H>,
    arguments: serde_json::Value,
) -> Result<String> {
    let params: ExecuteCommandsParams = serde_json::from_value(arguments)
        .map_err(|e| McpError::ProtocolError(format!("Invalid execute_commands arguments: {}", e)))?;

    let report = server
        .executor()
        .execute_commands(server.host(), &params.commands, params.validate_safety)
        .await?;

    Ok(serde_json::to_value(&report)?.to_string())
}

async fn handle_blocks_in_area<H: HostSession>(
    server: &McpServer<H>,
    arguments: serde_json::Value,
) -> Result<String> {
    let params: BlocksInAreaParams = serde_json::from_value(arguments)
        .map_err(|e| McpError::ProtocolError(format!("Invalid get_blocks_in_area arguments: {}", e)))?;

    let max = server.config().server.max_area_size as i64;
    let spans = [
        (params.from.x as i64 - params.to.x as i64).abs() + 1,
        (params.from.y as i64 - params.to.y as i64).abs() + 1,
        (params.from.z as i64 - params.to.z as i64).abs() + 1,
    ];
    if let Some(span) = spans.iter().find(|&&s| s > max) {
        return Err(McpError::ProtocolError(format!(
            "Area size ({}) exceeds maximum allowed per axis ({})",
            span, max
        )));
    }

    let blocks = server.host().blocks_in_area(params.from, params.to).await?;
    let compressed = compress_blocks(&blocks);
    Ok(serde_json::to_value(&compressed)?.to_string())
}

async fn handle_take_screenshot<H: HostSession>(
    server: &McpServer<H>,
    arguments: serde_json::Value,
) -> Result<String> {
    let params: ScreenshotParams = serde_json::from_value(arguments)
        .map_err(|e| McpError::ProtocolError(format!("Invalid take_screenshot arguments: {}", e)))?;

    let shot = server.host().take_screenshot(params).await?;
    Ok(shot.to_string())
}
