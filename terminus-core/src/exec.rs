// terminus-core/src/exec.rs

//! Cross-platform execution of shell commands.
//!
//! Commands run through the platform interpreter (`sh -c` on POSIX,
//! `powershell -Command` on Windows) with stdin detached and both output
//! streams captured as raw bytes for the encoding resolver. The executor is
//! total: launch failures, timeouts and unparseable command lines all come
//! back as an ordinary [`CommandResult`], never as an `Err`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::TerminalConfig;
use crate::encoding::{self, decode_output};
use crate::errors::ToolError;
use crate::tools::{CommandResult, TIMEOUT_EXIT_CODE};

/// A command accepted either pre-tokenized or as a raw string.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandLine {
    /// An argument vector. Re-quoted on the way to the shell so token
    /// boundaries survive arguments containing spaces or metacharacters.
    Tokens(Vec<String>),
    /// A raw command line, handed to the shell verbatim so the caller's own
    /// quoting, pipes and globs keep working.
    Raw(String),
}

impl From<&str> for CommandLine {
    fn from(raw: &str) -> Self {
        CommandLine::Raw(raw.to_string())
    }
}

impl From<String> for CommandLine {
    fn from(raw: String) -> Self {
        CommandLine::Raw(raw)
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(tokens: Vec<String>) -> Self {
        CommandLine::Tokens(tokens)
    }
}

impl CommandLine {
    /// Token view of the command, splitting raw strings with POSIX
    /// shell-word rules (quotes and escapes respected).
    pub fn tokens(&self) -> Result<Vec<String>, ToolError> {
        match self {
            CommandLine::Tokens(tokens) => Ok(tokens.clone()),
            CommandLine::Raw(raw) => {
                shell_words::split(raw).map_err(|e| ToolError::Parse(e.to_string()))
            }
        }
    }

    /// The line handed to the shell.
    fn shell_line(&self) -> String {
        match self {
            CommandLine::Tokens(tokens) => shell_words::join(tokens),
            CommandLine::Raw(raw) => raw.clone(),
        }
    }
}

/// Runs `command` in `cwd` through the platform shell and reports the
/// outcome.
///
/// The child inherits the process environment plus `env_overrides`, the
/// session-scoped variables set through the environment tool.
///
/// With `change_directory` set, a successful run does not rely on the child
/// process (whose own directory change dies with it): the new directory is
/// computed lexically from the command's second token, resolved against
/// `cwd`. A missing token resolves to `cwd` itself, and a failed command
/// leaves the reported directory untouched.
pub async fn execute(
    command: CommandLine,
    cwd: &Path,
    change_directory: bool,
    config: &TerminalConfig,
    env_overrides: &HashMap<String, String>,
) -> CommandResult {
    let tokens = match command.tokens() {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(command = ?command, error = %e, "Rejecting untokenizable command line");
            return CommandResult::failed(e.to_string(), cwd.to_path_buf());
        }
    };
    let command_line = command.shell_line();
    debug!(command = %command_line, cwd = ?cwd, "Executing shell command");

    let (shell, shell_arg) = if cfg!(target_os = "windows") {
        ("powershell", "-Command")
    } else {
        ("sh", "-c")
    };

    let spawned = Command::new(shell)
        .arg(shell_arg)
        .arg(&command_line)
        .envs(env_overrides)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!(command = %command_line, error = %e, "Failed to spawn shell process");
            return CommandResult::failed(
                format!("Failed to launch '{}': {}", command_line, e),
                cwd.to_path_buf(),
            );
        }
    };

    let timeout = config.command_timeout();
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return CommandResult::failed(
                format!("Failed to collect output of '{}': {}", command_line, e),
                cwd.to_path_buf(),
            );
        }
        Err(_) => {
            // Dropping the wait future kills the child (kill_on_drop).
            warn!(command = %command_line, ?timeout, "Command timed out");
            return CommandResult {
                success: false,
                stdout: String::new(),
                stderr: format!("Command timed out after {} seconds", timeout.as_secs()),
                returncode: TIMEOUT_EXIT_CODE,
                current_directory: cwd.to_path_buf(),
            };
        }
    };

    let mut candidates = encoding::resolve_labels(&config.encoding_candidates);
    candidates.extend(encoding::host_encoding_candidates());
    let stdout = decode_output(&output.stdout, &candidates);
    let stderr = decode_output(&output.stderr, &candidates);
    let returncode = output.status.code().unwrap_or(-1);
    let success = output.status.success();
    debug!(returncode, success, "Shell command finished");

    let current_directory = if change_directory && success {
        let target = tokens.get(1).map(String::as_str).unwrap_or("");
        normalize_path(&cwd.join(target))
    } else {
        cwd.to_path_buf()
    };

    CommandResult {
        success,
        stdout,
        stderr,
        returncode,
        current_directory,
    }
}

/// Lexically normalizes a path, folding `.` and `..` without consulting the
/// filesystem. Whether the directory exists was already decided by the shell
/// running the `cd`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::tempdir;

    #[test]
    fn raw_command_lines_tokenize_with_shell_rules() {
        let tokens = CommandLine::from(r#"echo "a b" c"#).tokens().unwrap();
        assert_eq!(tokens, vec!["echo", "a b", "c"]);
    }

    #[test]
    fn unbalanced_quote_is_a_parse_error() {
        let err = CommandLine::from("echo \"oops").tokens().unwrap_err();
        assert!(matches!(err, ToolError::Parse(_)));
    }

    #[test]
    fn token_lists_are_requoted_for_the_shell() {
        let line = CommandLine::Tokens(vec!["echo".into(), "a b".into()]).shell_line();
        assert_eq!(line, "echo 'a b'");
    }

    #[test]
    fn normalize_folds_dots_and_parents() {
        assert_eq!(normalize_path(Path::new("/a/b/sub")), PathBuf::from("/a/b/sub"));
        assert_eq!(normalize_path(Path::new("/a/b/..")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[tokio::test]
    async fn echo_succeeds_and_preserves_quoted_tokens() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let result = execute(r#"echo "a b" c"#.into(), dir.path(), false, &config, &HashMap::new()).await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(result.returncode, 0);
        assert_eq!(result.stdout.trim(), "a b c");
        assert_eq!(result.current_directory, dir.path());
    }

    #[tokio::test]
    async fn nonzero_exit_reports_failure() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let result = execute("this_command_does_not_exist_qwertyuiop".into(), dir.path(), false, &config, &HashMap::new()).await;
        assert!(!result.success);
        assert_ne!(result.returncode, 0);
        assert!(
            result.stderr.contains("not found") || result.stderr.contains("is not recognized"),
            "stderr: {}",
            result.stderr
        );
    }

    #[tokio::test]
    async fn shell_features_survive_raw_passthrough() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let result = execute("echo one && echo two".into(), dir.path(), false, &config, &HashMap::new()).await;
        assert!(result.success);
        assert!(result.stdout.contains("one"));
        assert!(result.stdout.contains("two"));
    }

    #[tokio::test]
    async fn env_overrides_reach_the_child() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert("TERMINUS_EXEC_OVERRIDE".to_string(), "applied".to_string());
        let result = execute(
            "printenv TERMINUS_EXEC_OVERRIDE".into(),
            dir.path(),
            false,
            &config,
            &overrides,
        )
        .await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(result.stdout.trim(), "applied");
    }

    #[tokio::test]
    async fn successful_cd_resolves_relative_target() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = TerminalConfig::default();
        let command = CommandLine::Tokens(vec!["cd".into(), "sub".into()]);
        let result = execute(command, dir.path(), true, &config, &HashMap::new()).await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(result.current_directory, dir.path().join("sub"));
    }

    #[tokio::test]
    async fn cd_dot_dot_walks_up() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = TerminalConfig::default();
        let start = dir.path().join("sub");
        let command = CommandLine::Tokens(vec!["cd".into(), "..".into()]);
        let result = execute(command, &start, true, &config, &HashMap::new()).await;
        assert!(result.success);
        assert_eq!(result.current_directory, dir.path());
    }

    #[tokio::test]
    async fn failed_cd_leaves_directory_unchanged() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let command = CommandLine::Tokens(vec!["cd".into(), "no_such_dir_here".into()]);
        let result = execute(command, dir.path(), true, &config, &HashMap::new()).await;
        assert!(!result.success);
        assert_eq!(result.current_directory, dir.path());
    }

    #[tokio::test]
    async fn bare_cd_is_a_noop_change() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig::default();
        let command = CommandLine::Tokens(vec!["cd".into()]);
        let result = execute(command, dir.path(), true, &config, &HashMap::new()).await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(result.current_directory, dir.path());
    }

    #[tokio::test]
    async fn timeout_kills_and_reports_distinct_failure() {
        let dir = tempdir().unwrap();
        let config = TerminalConfig {
            command_timeout_secs: 1,
            ..TerminalConfig::default()
        };
        let started = Instant::now();
        let result = execute("sleep 30".into(), dir.path(), false, &config, &HashMap::new()).await;
        assert!(started.elapsed().as_secs() < 10, "caller was hung");
        assert!(!result.success);
        assert_eq!(result.returncode, TIMEOUT_EXIT_CODE);
        assert!(result.stderr.contains("timed out"));
        assert_eq!(result.current_directory, dir.path());
    }
}
