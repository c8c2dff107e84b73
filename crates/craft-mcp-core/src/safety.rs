//! Safety policy and per-command validation
//!
//! Two layers guard the command sink: a fixed hard-deny set that no
//! configuration can override, and a configurable validator combining the
//! sanitized allow-list with destructive-pattern heuristics and volume caps.

use crate::config::McpConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Commands never permitted regardless of configuration
const HARD_DENY_COMMANDS: &[&str] = &[
    "op", "deop", "stop", "reload", "ban", "pardon", "ban-ip", "pardon-ip", "whitelist",
    "save-all", "save-off", "save-on", "debug",
];

static KILL_ALL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"kill\s+@[ae]").unwrap());
static CREATIVE_ALL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gamemode\s+creative\s+@a").unwrap());
static LARGE_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Count:(\d+)").unwrap());
static FILL_COORDINATES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"fill\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)").unwrap()
});

/// Reduce a raw command to its comparable base token:
/// trimmed, lower-cased, leading slash stripped, first whitespace-split token.
fn normalize_command_name(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    let normalized = normalized.strip_prefix('/').unwrap_or(&normalized);
    normalized
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Whether a command name is in the fixed deny set
pub fn is_hard_denied(command_name: &str) -> bool {
    let normalized = normalize_command_name(command_name);
    HARD_DENY_COMMANDS.contains(&normalized.as_str())
}

/// Sanitize an operator-supplied allow-list: normalize each entry, drop
/// empties and hard-denied names, de-duplicate preserving first-seen order.
pub fn filter_allowed_commands(configured: &[String]) -> Vec<String> {
    let mut filtered: Vec<String> = Vec::new();
    for raw in configured {
        let normalized = normalize_command_name(raw);
        if !normalized.is_empty()
            && !is_hard_denied(&normalized)
            && !filtered.contains(&normalized)
        {
            filtered.push(normalized);
        }
    }
    filtered
}

/// Result of validating one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Allowed,
    Rejected { reason: String },
}

impl ValidationResult {
    fn rejected(reason: impl Into<String>) -> Self {
        ValidationResult::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, ValidationResult::Allowed)
    }
}

/// Per-command safety validator
#[derive(Debug, Clone)]
pub struct SafetyValidator {
    enable_safety: bool,
    allowed_commands: Vec<String>,
    max_entities_per_command: u64,
    max_blocks_per_command: u64,
    block_creative_for_all: bool,
}

impl SafetyValidator {
    /// Build a validator from config. The configured allow-list is sanitized
    /// here so hard-denied entries can never be re-enabled.
    pub fn from_config(config: &McpConfig) -> Self {
        Self {
            enable_safety: config.server.enable_safety,
            allowed_commands: filter_allowed_commands(&config.server.allowed_commands),
            max_entities_per_command: config.safety.max_entities_per_command,
            max_blocks_per_command: config.safety.max_blocks_per_command,
            block_creative_for_all: config.safety.block_creative_for_all,
        }
    }

    /// The sanitized allow-list this validator enforces
    pub fn allowed_commands(&self) -> &[String] {
        &self.allowed_commands
    }

    pub fn validate(&self, command: &str) -> ValidationResult {
        if !self.enable_safety {
            return ValidationResult::Allowed;
        }

        let normalized = command.trim().to_lowercase();
        let normalized = normalized.strip_prefix('/').unwrap_or(&normalized);

        let Some(command_name) = normalized.split_whitespace().next() else {
            return ValidationResult::rejected("Empty command");
        };

        if !self.allowed_commands.iter().any(|c| c == command_name) {
            return ValidationResult::rejected(format!(
                "Command '{}' is not allowed",
                command_name
            ));
        }

        if KILL_ALL_PATTERN.is_match(normalized) {
            return ValidationResult::rejected(
                "Potentially destructive pattern detected: mass entity killing",
            );
        }

        if self.block_creative_for_all && CREATIVE_ALL_PATTERN.is_match(normalized) {
            return ValidationResult::rejected(
                "Setting creative mode for all players is not allowed",
            );
        }

        if let Some(caps) = LARGE_COUNT_PATTERN.captures(command) {
            // Digits that overflow the parse are certainly above the cap
            let count = caps[1].parse::<u64>().unwrap_or(u64::MAX);
            if count > self.max_entities_per_command {
                return ValidationResult::rejected(format!(
                    "Item/entity count ({}) exceeds maximum allowed ({})",
                    &caps[1], self.max_entities_per_command
                ));
            }
        }

        if command_name == "fill" {
            // A coordinate-parse failure means "cannot verify", not rejection
            if let Some(volume) = parse_fill_volume(normalized) {
                if volume > self.max_blocks_per_command as i128 {
                    return ValidationResult::rejected(format!(
                        "Fill area volume ({}) exceeds maximum allowed ({})",
                        volume, self.max_blocks_per_command
                    ));
                }
            }
        }

        ValidationResult::Allowed
    }
}

fn parse_fill_volume(command: &str) -> Option<i128> {
    let caps = FILL_COORDINATES_PATTERN.captures(command)?;
    let mut coords = [0i128; 6];
    for (i, coord) in coords.iter_mut().enumerate() {
        *coord = caps[i + 1].parse::<i128>().ok()?;
    }
    let volume = (coords[3] - coords[0] + 1).abs()
        * (coords[4] - coords[1] + 1).abs()
        * (coords[5] - coords[2] + 1).abs();
    Some(volume)
}
