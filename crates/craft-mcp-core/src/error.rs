//! Error types for craft-mcp

use thiserror::Error;

/// Result type for craft-mcp operations
pub type Result<T> = std::result::Result<T, McpError>;

/// craft-mcp error types
#[derive(Debug, Error)]
pub enum McpError {
    /// Host session is not available (no player / no world)
    #[error("Host session unavailable: {0}")]
    HostUnavailable(String),

    /// Command dispatch failed at the host
    #[error("Dispatch error: {0}")]
    DispatchError(String),

    /// Transport-level I/O error
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Malformed request or arguments
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Configuration load/save error
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::SerializationError(err.to_string())
    }
}

/// JSON-RPC error codes used on the wire
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}
