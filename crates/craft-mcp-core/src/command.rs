//! Per-command results and the aggregated execution report
//!
//! Wire shapes match what automation clients already consume: camelCase
//! field names, `applied` serialized as `true`/`false`/`null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Advisory hint attached to a normal execution report
pub const VERIFY_HINT: &str =
    "Use get_blocks_in_area to verify the built structure and fix any issues.";
/// Advisory hint attached when the batch was rejected by safety validation
pub const SAFETY_RETRY_HINT: &str = "Adjust commands to satisfy safety validation, then retry.";

/// Closed set of per-command outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Applied,
    RejectedByGame,
    RejectedBySafety,
    TimedOut,
    ExecutionError,
    Unknown,
}

/// Tri-state "did the command take effect".
///
/// `Unknown` is a real state (no classifiable feedback), so it is a variant
/// rather than a nullable boolean; on the wire it becomes `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Yes,
    No,
    Unknown,
}

impl Applied {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Applied::Yes => Some(true),
            Applied::No => Some(false),
            Applied::Unknown => None,
        }
    }
}

impl Serialize for Applied {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_bool().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Applied {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            Some(true) => Applied::Yes,
            Some(false) => Applied::No,
            None => Applied::Unknown,
        })
    }
}

/// Result of one submitted command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub index: usize,
    pub command: String,
    pub status: CommandStatus,
    pub accepted: bool,
    pub applied: Applied,
    pub execution_time_ms: u64,
    pub summary: String,
    pub chat_messages: Vec<String>,
}

/// Aggregated report for one `execute_commands` call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub total_commands: usize,
    pub accepted_count: usize,
    pub applied_count: usize,
    pub failed_count: usize,
    pub results: Vec<CommandResult>,
    /// All captured feedback, in arrival order across the whole batch
    pub chat_messages: Vec<String>,
    pub hint: String,
}

impl ExecutionReport {
    /// Aggregate per-command results; counts are derived, never supplied.
    pub fn from_results(
        results: Vec<CommandResult>,
        chat_messages: Vec<String>,
        hint: impl Into<String>,
    ) -> Self {
        let accepted_count = results.iter().filter(|r| r.accepted).count();
        let applied_count = results
            .iter()
            .filter(|r| r.applied == Applied::Yes)
            .count();
        let failed_count = results.iter().filter(|r| r.applied == Applied::No).count();

        Self {
            total_commands: results.len(),
            accepted_count,
            applied_count,
            failed_count,
            results,
            chat_messages,
            hint: hint.into(),
        }
    }

    /// Report for a batch aborted before dispatch: the failing index carries
    /// the validator's reason, every other index a generic skip reason.
    pub fn safety_rejected(commands: &[String], failed_index: usize, reason: &str) -> Self {
        let failed_summary = format!("Command rejected by safety validator: {}", reason);
        let skipped_summary = format!(
            "Skipped because safety validation failed at command {}",
            failed_index + 1
        );

        let results = commands
            .iter()
            .enumerate()
            .map(|(i, command)| CommandResult {
                index: i,
                command: command.clone(),
                status: CommandStatus::RejectedBySafety,
                accepted: false,
                applied: Applied::No,
                execution_time_ms: 0,
                summary: if i == failed_index {
                    failed_summary.clone()
                } else {
                    skipped_summary.clone()
                },
                chat_messages: Vec::new(),
            })
            .collect();

        let mut report = Self::from_results(results, Vec::new(), SAFETY_RETRY_HINT);
        // Safety-rejected results still count as failed=0: nothing reached
        // the host, so applied/failed tallies are forced to zero.
        report.applied_count = 0;
        report.failed_count = 0;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, accepted: bool, applied: Applied) -> CommandResult {
        CommandResult {
            index,
            command: format!("cmd-{}", index),
            status: CommandStatus::Unknown,
            accepted,
            applied,
            execution_time_ms: 5,
            summary: "test".into(),
            chat_messages: Vec::new(),
        }
    }

    #[test]
    fn test_counts_derived_from_results() {
        let report = ExecutionReport::from_results(
            vec![
                result(0, true, Applied::Yes),
                result(1, true, Applied::No),
                result(2, true, Applied::Unknown),
                result(3, false, Applied::No),
            ],
            vec!["msg".into()],
            VERIFY_HINT,
        );
        assert_eq!(report.total_commands, 4);
        assert_eq!(report.accepted_count, 3);
        assert_eq!(report.applied_count, 1);
        assert_eq!(report.failed_count, 2);
    }

    #[test]
    fn test_safety_rejected_shape() {
        let commands = vec!["say hi".to_string(), "kill @a".to_string()];
        let report = ExecutionReport::safety_rejected(&commands, 1, "not allowed");

        assert_eq!(report.total_commands, 2);
        assert_eq!(report.accepted_count, 0);
        assert_eq!(report.applied_count, 0);
        assert_eq!(report.failed_count, 0);
        assert!(
            report
                .results
                .iter()
                .all(|r| r.status == CommandStatus::RejectedBySafety)
        );
        assert!(report.results[1].summary.contains("not allowed"));
        assert!(report.results[0].summary.contains("command 2"));
        assert_eq!(report.hint, SAFETY_RETRY_HINT);
    }

    #[test]
    fn test_applied_serializes_as_nullable_bool() {
        let json = serde_json::to_value(result(0, true, Applied::Unknown)).unwrap();
        assert!(json["applied"].is_null());
        assert_eq!(json["executionTimeMs"], 5);

        let json = serde_json::to_value(result(0, true, Applied::Yes)).unwrap();
        assert_eq!(json["applied"], true);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(CommandStatus::RejectedByGame).unwrap(),
            "rejected_by_game"
        );
        assert_eq!(
            serde_json::to_value(CommandStatus::TimedOut).unwrap(),
            "timed_out"
        );
    }
}
