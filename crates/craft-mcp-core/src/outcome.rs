//! Heuristic classification of command feedback
//!
//! The host never reports structured success/failure for chat-dispatched
//! commands; all we get is free-form feedback text. `analyze` maps that text
//! onto a closed outcome via static, ordered marker tables. A failure marker
//! anywhere in the feedback outranks any success marker.

use crate::command::{Applied, CommandStatus};

/// Markers whose presence means the game rejected the command
const FAILURE_MARKERS: &[&str] = &[
    "cannot",
    "failed",
    "unknown",
    "no entity was found",
    "is not holding any item",
    "invalid",
    "error",
];

/// Markers whose presence means the command visibly took effect
const SUCCESS_MARKERS: &[&str] = &[
    "successfully",
    "teleported",
    "summoned",
    "given",
    "gave",
    "set the weather",
    "set the time",
    "filled",
    "set block",
    "changed the block",
];

/// Classified outcome of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub accepted: bool,
    pub applied: Applied,
    pub status: CommandStatus,
    pub summary: String,
}

/// Classify a command outcome from its captured feedback.
///
/// Pure and deterministic: the same inputs always yield the same outcome.
pub fn analyze(accepted: bool, feedback: &[String], fallback_summary: &str) -> Outcome {
    if !accepted {
        let summary = if fallback_summary.trim().is_empty() {
            "Command was not accepted for execution".to_string()
        } else {
            fallback_summary.to_string()
        };
        return Outcome {
            accepted: false,
            applied: Applied::No,
            status: CommandStatus::ExecutionError,
            summary,
        };
    }

    if let Some(message) = first_matching(feedback, FAILURE_MARKERS) {
        return Outcome {
            accepted: true,
            applied: Applied::No,
            status: CommandStatus::RejectedByGame,
            summary: message.to_string(),
        };
    }

    if let Some(message) = first_matching(feedback, SUCCESS_MARKERS) {
        return Outcome {
            accepted: true,
            applied: Applied::Yes,
            status: CommandStatus::Applied,
            summary: message.to_string(),
        };
    }

    let summary = feedback
        .first()
        .cloned()
        .unwrap_or_else(|| "No command feedback captured".to_string());
    Outcome {
        accepted: true,
        applied: Applied::Unknown,
        status: CommandStatus::Unknown,
        summary,
    }
}

/// First message (in arrival order) containing any marker, case-insensitively
fn first_matching<'a>(messages: &'a [String], markers: &[&str]) -> Option<&'a str> {
    messages.iter().map(String::as_str).find(|message| {
        let normalized = message.to_lowercase();
        markers.iter().any(|marker| normalized.contains(marker))
    })
}
