//! # craft-mcp-core
//!
//! Core types and logic for the craft-mcp bridge.
//!
//! This crate provides the runtime-independent pieces shared by the server
//! and client crates:
//! - Safety policy and per-command validation
//! - Command outcome classification from captured feedback
//! - Execution report types and their wire shapes
//! - Region compression for block-scan results
//! - Configuration

pub mod command;
pub mod config;
pub mod error;
pub mod outcome;
pub mod region;
pub mod safety;

pub use command::{
    Applied, CommandResult, CommandStatus, ExecutionReport, SAFETY_RETRY_HINT, VERIFY_HINT,
};
pub use config::{ClientConfig, McpConfig, SafetyConfig, ServerConfig};
pub use error::{McpError, Result, error_codes};
pub use outcome::{Outcome, analyze};
pub use region::{
    BlockTypeSummary, CompressedScan, LabeledBlock, Region, VoxelPos, compress_blocks,
};
pub use safety::{SafetyValidator, ValidationResult, filter_allowed_commands, is_hard_denied};
