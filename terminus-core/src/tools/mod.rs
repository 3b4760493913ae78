// terminus-core/src/tools/mod.rs

//! Tool implementations layered on top of the execution core.
//!
//! Every tool, whether it spawns a subprocess or wraps a filesystem call,
//! reports through the same [`CommandResult`] envelope. Failures travel in
//! `stderr` and `returncode`; no tool function returns an error to its
//! caller. A hosting protocol layer can therefore forward results without
//! wrapping the whole surface in error handling.

pub mod env;
pub mod fs;
pub mod shell;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ToolError;

/// Exit code reported when the underlying process never ran (launch failure,
/// unparseable command line, filesystem error).
pub const NEVER_RAN_EXIT_CODE: i32 = 1;

/// Exit code reported when a command exceeds its timeout, matching the
/// convention of GNU `timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// The structured outcome of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// True iff `returncode` is zero.
    pub success: bool,
    /// Decoded standard output. Never absent, default empty.
    #[serde(default)]
    pub stdout: String,
    /// Decoded standard error, or a synthesized failure description.
    #[serde(default)]
    pub stderr: String,
    /// Exit code of the process, or a failure sentinel if it never ran.
    pub returncode: i32,
    /// Working directory after this invocation. Equal to the input directory
    /// unless the call was a successful directory change.
    pub current_directory: PathBuf,
}

impl CommandResult {
    /// A successful result carrying tool output.
    pub fn ok(stdout: impl Into<String>, current_directory: PathBuf) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
            returncode: 0,
            current_directory,
        }
    }

    /// A failure for an operation that never ran to completion.
    pub fn failed(stderr: impl Into<String>, current_directory: PathBuf) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
            returncode: NEVER_RAN_EXIT_CODE,
            current_directory,
        }
    }
}

/// Folds a tool internal outcome into the uniform envelope.
pub(crate) fn envelope(outcome: Result<String, ToolError>, cwd: PathBuf) -> CommandResult {
    match outcome {
        Ok(stdout) => CommandResult::ok(stdout, cwd),
        Err(e) => CommandResult::failed(e.to_string(), cwd),
    }
}
