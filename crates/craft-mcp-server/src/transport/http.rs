//! HTTP transport
//!
//! Serves the protocol at `POST /mcp`. Requests must carry an `Accept`
//! header naming a JSON or event-stream media type; the `Origin` header,
//! when present, must be loopback, `null`, or a file URL. Responses carry
//! permissive CORS headers so local tooling (including file:// pages) can
//! talk to the bridge.

use crate::McpServer;
use crate::dispatcher::handle_raw;
use crate::host::HostSession;
use crate::rpc::Response as RpcResponse;
use crate::transport::stdio::serialize_response;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use craft_mcp_core::{McpError, Result, error_codes};
use std::sync::Arc;
use tracing::{debug, info};

/// Run the server on the HTTP transport
pub async fn run<H: HostSession>(server: Arc<McpServer<H>>) -> Result<()> {
    let addr = format!(
        "{}:{}",
        server.config().server.host,
        server.config().server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| McpError::TransportError(format!("Failed to bind {}: {}", addr, e)))?;

    info!("craft-mcp server listening on http://{}/mcp", addr);

    axum::serve(listener, router(server))
        .await
        .map_err(|e| McpError::TransportError(format!("HTTP server failed: {}", e)))
}

/// Build the axum router
pub fn router<H: HostSession>(server: Arc<McpServer<H>>) -> Router {
    Router::new()
        .route("/mcp", post(handle_post::<H>).get(handle_get))
        .with_state(server)
}

async fn handle_post<H: HostSession>(
    State(server): State<Arc<McpServer<H>>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(origin) = header_str(&headers, header::ORIGIN) {
        if !is_allowed_origin(origin) {
            return error_response(StatusCode::FORBIDDEN, "Forbidden origin");
        }
    }

    let accept = header_str(&headers, header::ACCEPT).unwrap_or("");
    if !accept.contains("application/json") && !accept.contains("text/event-stream") {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Accept header");
    }

    debug!("Received: {}", body);
    match handle_raw(&server, body.trim()).await {
        Some(response) => json_response(StatusCode::OK, serialize_response(&response)),
        // Notification: accepted, nothing to say
        None => json_response(StatusCode::ACCEPTED, "{}".to_string()),
    }
}

async fn handle_get(headers: HeaderMap) -> Response {
    let accept = header_str(&headers, header::ACCEPT).unwrap_or("");
    if accept.contains("text/event-stream") {
        error_response(
            StatusCode::NOT_IMPLEMENTED,
            "Server-Sent Events not implemented",
        )
    } else {
        error_response(
            StatusCode::BAD_REQUEST,
            "GET requests require text/event-stream Accept header",
        )
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Origins permitted to reach the bridge: loopback, `null` (file:// pages
/// in most browsers), and explicit file URLs.
fn is_allowed_origin(origin: &str) -> bool {
    origin.starts_with("http://localhost")
        || origin.starts_with("https://localhost")
        || origin.starts_with("http://127.0.0.1")
        || origin.starts_with("https://127.0.0.1")
        || origin == "null"
        || origin.starts_with("file://")
}

fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Accept, Origin",
            ),
        ],
        body,
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serialize_response(&RpcResponse::error(
        None,
        error_codes::INTERNAL_ERROR,
        message,
    ));
    json_response(status, body)
}
