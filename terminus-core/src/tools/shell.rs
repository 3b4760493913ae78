// terminus-core/src/tools/shell.rs

//! Command execution tools: the session-aware front door to the executor.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::TerminalConfig;
use crate::exec::{execute, CommandLine};
use crate::session::Session;
use crate::tools::CommandResult;

/// Runs a command line against the session's working directory.
///
/// `cd` is intercepted before it reaches a subprocess: a child changing its
/// own directory would not outlive the call, so directory changes are routed
/// through [`set_working_directory`] instead. Everything else executes
/// verbatim against a snapshot of the session directory and never mutates it.
pub async fn run_command(session: &Session, config: &TerminalConfig, command: &str) -> CommandResult {
    let cwd = session.working_directory();
    let tokens = match shell_words::split(command) {
        Ok(tokens) => tokens,
        Err(e) => {
            return CommandResult::failed(format!("Failed to parse command line: {}", e), cwd)
        }
    };

    match tokens.first().map(String::as_str) {
        Some("cd") => {
            let path = tokens.get(1).cloned().unwrap_or_default();
            set_working_directory(session, config, &path).await
        }
        _ => {
            let overrides = session.environment_overrides();
            execute(CommandLine::Raw(command.to_string()), &cwd, false, config, &overrides).await
        }
    }
}

/// Changes the session working directory.
///
/// The change runs as a real `cd` through the shell, so existence and
/// permission checks follow the shell's rules; the resulting directory is
/// then computed here and written back. A failed `cd` leaves the session
/// untouched, and an empty path is a no-op change.
pub async fn set_working_directory(
    session: &Session,
    config: &TerminalConfig,
    path: &str,
) -> CommandResult {
    let cwd = session.working_directory();
    // `cd ''` fails in POSIX shells, so a missing path becomes a bare `cd`.
    let command = if path.is_empty() {
        CommandLine::Tokens(vec!["cd".to_string()])
    } else {
        CommandLine::Tokens(vec!["cd".to_string(), path.to_string()])
    };

    let overrides = session.environment_overrides();
    let result = execute(command, &cwd, true, config, &overrides).await;
    if result.success {
        info!(from = ?cwd, to = ?result.current_directory, "Session changed directory");
        session.set_working_directory(result.current_directory.clone());
    } else {
        debug!(path, "Directory change failed; session unchanged");
    }
    result
}

/// Read-only view of the tracked working directory.
pub fn get_working_directory(session: &Session) -> PathBuf {
    session.working_directory()
}
