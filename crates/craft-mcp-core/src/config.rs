//! Configuration for the craft-mcp bridge
//!
//! Loaded from a JSON file; any missing field falls back to its default so
//! old config files keep working after upgrades.

use crate::error::{McpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub safety: SafetyConfig,
}

/// Server transport and execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport to serve on: "stdio", "tcp", or "http"
    pub transport: String,
    pub host: String,
    /// HTTP listen port
    pub port: u16,
    /// Newline-delimited socket listen port
    pub tcp_port: u16,
    pub enable_safety: bool,
    /// Per-axis limit for block scans
    pub max_area_size: u32,
    pub allowed_commands: Vec<String>,
    /// Hard cap on a single command dispatch
    pub request_timeout_ms: u64,
    /// Feedback collection window after each dispatched command.
    /// Tuned for observed host latency; override per deployment.
    pub message_wait_ms: u64,
    /// Cut the window short once no new feedback arrived for this long
    /// after at least one message was seen.
    pub message_idle_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "http".into(),
            host: "localhost".into(),
            port: 8080,
            tcp_port: 8765,
            enable_safety: true,
            max_area_size: 48,
            allowed_commands: [
                "fill", "clone", "setblock", "summon", "tp", "give", "gamemode", "effect",
                "enchant", "weather", "time", "say", "tell", "title",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            request_timeout_ms: 30_000,
            message_wait_ms: 700,
            message_idle_ms: 120,
        }
    }
}

/// Game host link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Address of the in-game bridge socket
    pub game_host: String,
    pub game_port: u16,
    pub show_notifications: bool,
    pub log_commands: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game_host: "localhost".into(),
            game_port: 25565,
            show_notifications: true,
            log_commands: false,
        }
    }
}

/// Safety caps applied by the command validator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub max_entities_per_command: u64,
    pub max_blocks_per_command: u64,
    pub block_creative_for_all: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_entities_per_command: 10,
            max_blocks_per_command: 125_000,
            block_creative_for_all: true,
        }
    }
}

impl McpConfig {
    /// Load config from a file, falling back to defaults (and writing them
    /// out) when the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(config) => return config,
                    Err(e) => warn!("Failed to parse config file, using defaults: {}", e),
                },
                Err(e) => warn!("Failed to read config file, using defaults: {}", e),
            }
        }

        let config = Self::default();
        if let Err(e) = config.save(path) {
            warn!("Failed to write default config: {}", e);
        }
        config
    }

    /// Write config to a file as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| McpError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| McpError::ConfigError(format!("Failed to write config: {}", e)))
    }
}
