//! Wire protocol for the game link
//!
//! Newline-delimited JSON with internally-tagged enums. The bridge sends
//! one `HostRequest` per line and the game answers each with exactly one
//! `Ok` or `Error` reply, in request order. `Feedback` lines are pushed by
//! the game at any time and are not replies.

use craft_mcp_core::VoxelPos;
use serde::{Deserialize, Serialize};

/// Bridge -> game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostRequest {
    /// Dispatch one command to the game's command sink
    Command { command: String },

    /// Snapshot of the controlled player's state
    PlayerInfo,

    /// All non-air blocks in the given area
    BlocksInArea { from: VoxelPos, to: VoxelPos },

    /// Capture a screenshot, optionally repositioning the camera first
    Screenshot {
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        z: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        yaw: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pitch: Option<f32>,
    },
}

/// Game -> bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostReply {
    /// Successful reply; `data` shape depends on the request
    Ok {
        #[serde(default)]
        data: serde_json::Value,
    },

    /// Failed reply
    Error { message: String },

    /// Push notification: chat/system feedback text observed in-game
    Feedback { message: String },
}

/// Serialize a request to one JSON line (no trailing newline)
pub fn encode(request: &HostRequest) -> Result<String, serde_json::Error> {
    serde_json::to_string(request)
}

/// Deserialize one JSON line from the game
pub fn decode(line: &str) -> Result<HostReply, serde_json::Error> {
    serde_json::from_str(line)
}
