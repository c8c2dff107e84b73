//! Command execution pipeline
//!
//! Orchestrates one `execute_commands` batch: validate every command up
//! front, then for each command dispatch to the host sink, collect feedback
//! from the capture window, classify the outcome, and aggregate a report.
//! Commands run strictly sequentially; the host's command sink and feedback
//! stream are shared ordered resources, and parallel dispatch would make
//! feedback-to-command correlation ambiguous.

use crate::feedback::FeedbackCapture;
use crate::host::HostSession;
use craft_mcp_core::{
    Applied, CommandResult, CommandStatus, ExecutionReport, McpConfig, McpError, Result,
    SafetyValidator, ValidationResult, VERIFY_HINT, analyze,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Poll slice while inside the feedback collection window
const FEEDBACK_POLL_SLICE: Duration = Duration::from_millis(75);

/// Executes command batches against a host session
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    validator: SafetyValidator,
    request_timeout: Duration,
    message_wait: Duration,
    message_idle: Duration,
    log_commands: bool,
}

impl CommandExecutor {
    pub fn from_config(config: &McpConfig) -> Self {
        Self {
            validator: SafetyValidator::from_config(config),
            request_timeout: Duration::from_millis(config.server.request_timeout_ms),
            message_wait: Duration::from_millis(config.server.message_wait_ms),
            message_idle: Duration::from_millis(config.server.message_idle_ms),
            log_commands: config.client.log_commands,
        }
    }

    /// The sanitized allow-list the executor validates against
    pub fn allowed_commands(&self) -> &[String] {
        self.validator.allowed_commands()
    }

    /// Run one batch. Safety rejection and host unavailability abort the
    /// whole batch before anything is dispatched; every later failure is
    /// isolated to its command.
    pub async fn execute_commands<H: HostSession>(
        &self,
        host: &H,
        commands: &[String],
        validate_safety: bool,
    ) -> Result<ExecutionReport> {
        if validate_safety {
            for (index, command) in commands.iter().enumerate() {
                if let ValidationResult::Rejected { reason } = self.validator.validate(command) {
                    info!("Safety validation failed at command {}: {}", index, reason);
                    return Ok(ExecutionReport::safety_rejected(commands, index, &reason));
                }
            }
        }

        if !host.is_available() {
            return Err(McpError::HostUnavailable(
                "Player or world is not available".into(),
            ));
        }

        let capture = host.feedback();
        capture.start_capturing();
        let _window = CaptureWindow(&capture);
        // Anything queued before this batch is stale
        capture.drain_available();

        let mut results = Vec::with_capacity(commands.len());
        let mut all_messages = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            let dispatch = self.dispatch_one(host, command).await;
            let messages = self.collect_feedback(&capture).await;
            all_messages.extend_from_slice(&messages);
            results.push(self.classify(index, command, dispatch, messages));
        }

        Ok(ExecutionReport::from_results(
            results,
            all_messages,
            VERIFY_HINT,
        ))
    }

    /// Dispatch one command, bounded by the per-command timeout. On timeout
    /// the dispatch future is dropped, so a late host result can never leak
    /// into a later command.
    async fn dispatch_one<H: HostSession>(&self, host: &H, command: &str) -> Dispatch {
        if self.log_commands {
            info!("Executing command: /{}", command.trim_start_matches('/'));
        }

        let start = Instant::now();
        match tokio::time::timeout(self.request_timeout, host.send_command(command)).await {
            Ok(Ok(())) => Dispatch {
                accepted: true,
                status: CommandStatus::Unknown,
                summary: "Command sent".into(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
            Ok(Err(e)) => {
                warn!("Command dispatch failed: {}", e);
                Dispatch {
                    accepted: false,
                    status: CommandStatus::ExecutionError,
                    summary: format!("Failed to execute command: {}", e),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                }
            }
            Err(_) => Dispatch {
                accepted: false,
                status: CommandStatus::TimedOut,
                summary: "Command timed out".into(),
                elapsed_ms: self.request_timeout.as_millis() as u64,
            },
        }
    }

    /// Collect feedback for one command: wait out the window, extending as
    /// messages arrive, but cut short once the stream has gone idle after at
    /// least one message. Whatever is still queued afterwards belongs to
    /// this command too.
    async fn collect_feedback(&self, capture: &FeedbackCapture) -> Vec<String> {
        let mut messages = Vec::new();
        let start = Instant::now();
        let mut last_message_at = start;

        while start.elapsed() < self.message_wait {
            if let Some(message) = capture.wait_for_message(FEEDBACK_POLL_SLICE).await {
                debug!("Captured feedback: {}", message);
                messages.push(message);
                last_message_at = Instant::now();
                continue;
            }
            if !messages.is_empty() && last_message_at.elapsed() >= self.message_idle {
                break;
            }
        }

        messages.extend(capture.drain_available());
        messages
    }

    fn classify(
        &self,
        index: usize,
        command: &str,
        dispatch: Dispatch,
        messages: Vec<String>,
    ) -> CommandResult {
        if !dispatch.accepted {
            return CommandResult {
                index,
                command: command.to_string(),
                status: dispatch.status,
                accepted: false,
                applied: Applied::No,
                execution_time_ms: dispatch.elapsed_ms,
                summary: dispatch.summary,
                chat_messages: messages,
            };
        }

        let outcome = analyze(true, &messages, &dispatch.summary);
        CommandResult {
            index,
            command: command.to_string(),
            status: outcome.status,
            accepted: outcome.accepted,
            applied: outcome.applied,
            execution_time_ms: dispatch.elapsed_ms,
            summary: outcome.summary,
            chat_messages: messages,
        }
    }
}

struct Dispatch {
    accepted: bool,
    status: CommandStatus,
    summary: String,
    elapsed_ms: u64,
}

/// Closes the capture window on every exit path
struct CaptureWindow<'a>(&'a FeedbackCapture);

impl Drop for CaptureWindow<'_> {
    fn drop(&mut self) {
        self.0.stop_capturing();
    }
}
