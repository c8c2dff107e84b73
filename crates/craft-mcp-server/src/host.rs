//! Host session capability trait
//!
//! The server core never talks to the game directly. Everything it needs
//! from the host — the command sink, the feedback stream, and the snapshot
//! providers backing the read-only tools — comes through this narrow
//! interface, so bridges to different host builds stay thin.

use crate::feedback::FeedbackCapture;
use async_trait::async_trait;
use craft_mcp_core::{LabeledBlock, Result, VoxelPos};
use serde::Deserialize;

/// Optional camera placement for a screenshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreenshotParams {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub yaw: Option<f32>,
    pub pitch: Option<f32>,
}

/// Capabilities the host application exposes to the server
#[async_trait]
pub trait HostSession: Send + Sync + 'static {
    /// Whether an active session (player and world) exists right now
    fn is_available(&self) -> bool;

    /// Handle to the capture queue this host feeds its feedback into
    fn feedback(&self) -> FeedbackCapture;

    /// Dispatch one command to the host's command sink.
    ///
    /// Resolves once the host has taken the command, not once its effects
    /// are observable; effects are judged from captured feedback.
    async fn send_command(&self, command: &str) -> Result<()>;

    /// Snapshot of the controlled player's state
    async fn player_info(&self) -> Result<serde_json::Value>;

    /// All non-air blocks in the given area
    async fn blocks_in_area(&self, from: VoxelPos, to: VoxelPos) -> Result<Vec<LabeledBlock>>;

    /// Capture a screenshot, optionally repositioning the camera first
    async fn take_screenshot(&self, params: ScreenshotParams) -> Result<serde_json::Value>;
}
