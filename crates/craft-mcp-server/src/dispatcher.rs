//! JSON-RPC method routing
//!
//! Shared by every transport: parse, route the fixed method namespace,
//! build the response envelope. Methods under the `notifications/` prefix
//! are acknowledged silently — `None` means "send nothing", and transports
//! must treat that as a valid outcome.

use crate::McpServer;
use crate::host::HostSession;
use crate::rpc::{Request, RequestId, Response};
use crate::tools::{handle_tool_call, list_tools};
use craft_mcp_core::error_codes;
use tracing::debug;

/// Protocol version offered by default
const PROTOCOL_VERSION: &str = "2025-06-18";
/// Older revision still accepted when the client asks for it
const PROTOCOL_VERSION_COMPAT: &str = "2025-03-26";

/// Handle one raw request line/body. Returns `None` when no response must
/// be sent (notifications).
pub async fn handle_raw<H: HostSession>(server: &McpServer<H>, raw: &str) -> Option<Response> {
    let request: Request = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            // Best effort: salvage the id so the client can correlate
            let id = serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|v| v.get("id").cloned())
                .and_then(|v| serde_json::from_value::<RequestId>(v).ok());
            return Some(Response::error(
                id,
                error_codes::PARSE_ERROR,
                format!("Error processing request: {}", e),
            ));
        }
    };

    handle_request(server, request).await
}

/// Route one parsed request
pub async fn handle_request<H: HostSession>(
    server: &McpServer<H>,
    request: Request,
) -> Option<Response> {
    if request.method.starts_with("notifications/") {
        debug!("Received notification: {}", request.method);
        return None;
    }

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(&request),
        "ping" => Response::success(request.id, serde_json::json!({ "status": "pong" })),
        "tools/list" => Response::success(
            request.id,
            serde_json::json!({ "tools": list_tools(server) }),
        ),
        "tools/call" => handle_tools_call(server, request).await,
        _ => Response::error(
            request.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown method: {}", request.method),
        ),
    };

    Some(response)
}

fn handle_initialize(request: &Request) -> Response {
    let mut protocol_version = PROTOCOL_VERSION;
    if let Some(requested) = request.params.get("protocolVersion").and_then(|v| v.as_str()) {
        if requested == PROTOCOL_VERSION_COMPAT {
            protocol_version = PROTOCOL_VERSION_COMPAT;
        }
    }

    Response::success(
        request.id.clone(),
        serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "craft-mcp-server",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

async fn handle_tools_call<H: HostSession>(server: &McpServer<H>, request: Request) -> Response {
    #[derive(serde::Deserialize)]
    struct ToolCallParams {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    }

    let params: ToolCallParams = match serde_json::from_value(request.params) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id,
                error_codes::INVALID_PARAMS,
                format!("Invalid tool call params: {}", e),
            );
        }
    };

    handle_tool_call(server, &params.name, params.arguments, request.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackCapture;
    use crate::host::ScreenshotParams;
    use async_trait::async_trait;
    use craft_mcp_core::{LabeledBlock, McpConfig, Result, VoxelPos};

    struct StubHost {
        capture: FeedbackCapture,
    }

    #[async_trait]
    impl HostSession for StubHost {
        fn is_available(&self) -> bool {
            true
        }

        fn feedback(&self) -> FeedbackCapture {
            self.capture.clone()
        }

        async fn send_command(&self, _command: &str) -> Result<()> {
            self.capture.push("Successfully executed");
            Ok(())
        }

        async fn player_info(&self) -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "name": "Steve", "x": 0, "y": 64, "z": 0 }))
        }

        async fn blocks_in_area(
            &self,
            from: VoxelPos,
            _to: VoxelPos,
        ) -> Result<Vec<LabeledBlock>> {
            Ok(vec![LabeledBlock {
                x: from.x,
                y: from.y,
                z: from.z,
                block_type: "stone".into(),
            }])
        }

        async fn take_screenshot(&self, _params: ScreenshotParams) -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "path": "screenshot.png" }))
        }
    }

    fn server() -> McpServer<StubHost> {
        let mut config = McpConfig::default();
        config.server.message_wait_ms = 40;
        config.server.message_idle_ms = 15;
        McpServer::new(
            StubHost {
                capture: FeedbackCapture::new(),
            },
            config,
        )
    }

    async fn call(server: &McpServer<StubHost>, raw: &str) -> Option<Response> {
        handle_raw(server, raw).await
    }

    #[tokio::test]
    async fn test_initialize_default_version() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#,
        )
        .await
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-06-18");
        assert_eq!(result["serverInfo"]["name"], "craft-mcp-server");
    }

    #[tokio::test]
    async fn test_initialize_compat_version_echoed() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response.result.unwrap()["protocolVersion"], "2025-03-26");
    }

    #[tokio::test]
    async fn test_ping() {
        let s = server();
        let response = call(&s, r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["status"], "pong");
        assert_eq!(response.id, Some(RequestId::Number(2)));
    }

    #[tokio::test]
    async fn test_notifications_produce_no_response() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_is_protocol_error() {
        let s = server();
        let response = call(&s, r#"{"jsonrpc":"2.0","id":3,"method":"bogus"}"#)
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert!(error.message.contains("bogus"));
        assert_eq!(response.id, Some(RequestId::Number(3)));
    }

    #[tokio::test]
    async fn test_unparseable_input_salvages_id() {
        let s = server();
        // Valid JSON, but not a valid request (method missing)
        let response = call(&s, r#"{"jsonrpc":"2.0","id":9}"#).await.unwrap();
        assert_eq!(response.id, Some(RequestId::Number(9)));
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_tools_list_reflects_config() {
        let s = server();
        let response = call(&s, r#"{"jsonrpc":"2.0","id":4,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "execute_commands",
                "get_player_info",
                "get_blocks_in_area",
                "take_screenshot"
            ]
        );
        // Live limits surface in the catalog
        assert!(
            tools[2]["description"]
                .as_str()
                .unwrap()
                .contains("48 blocks")
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_structured_result() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
        )
        .await
        .unwrap();
        // Not a protocol fault: result carries isError
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(
            result["content"][0]["text"]
                .as_str()
                .unwrap()
                .contains("Unknown tool: nope")
        );
    }

    #[tokio::test]
    async fn test_execute_commands_roundtrip() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"execute_commands","arguments":{"commands":["say hi"]}}}"#,
        )
        .await
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let report: serde_json::Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(report["totalCommands"], 1);
        assert_eq!(report["acceptedCount"], 1);
        assert_eq!(report["appliedCount"], 1);
    }

    #[tokio::test]
    async fn test_blocks_in_area_compressed_and_capped() {
        let s = server();
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"get_blocks_in_area","arguments":{"from":{"x":0,"y":0,"z":0},"to":{"x":1,"y":1,"z":1}}}}"#,
        )
        .await
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let scan: serde_json::Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(scan["blocks"][0]["blockType"], "stone");

        // Oversized area rejected as a structured result
        let response = call(
            &s,
            r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"get_blocks_in_area","arguments":{"from":{"x":0,"y":0,"z":0},"to":{"x":500,"y":0,"z":0}}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response.result.unwrap()["isError"], true);
    }
}
