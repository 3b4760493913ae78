// terminus-core/src/tools/fs.rs

//! File and directory tools.
//!
//! Simple I/O wrappers: each resolves its paths against a snapshot of the
//! session directory, does one filesystem operation, and reports through the
//! uniform envelope. None of them ever moves the session.

use std::fs;
use std::io::Write;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::errors::ToolError;
use crate::session::Session;
use crate::tools::{envelope, CommandResult};

/// Creates a directory (and any missing parents) relative to the session.
pub async fn create_directory(session: &Session, path: &str) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    info!(path = ?absolute, "Creating directory");
    let outcome = fs::create_dir_all(&absolute)
        .map(|_| format!("Directory '{}' created successfully.", absolute.display()))
        .map_err(ToolError::from);
    envelope(outcome, cwd)
}

/// Creates (or overwrites) a file with the given content, creating parent
/// directories as needed.
pub async fn create_file(session: &Session, path: &str, content: &str) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    info!(path = ?absolute, bytes = content.len(), "Writing file");
    envelope(write_file(&absolute, content), cwd)
}

/// Appends content to a file, creating it if missing. A newline is written
/// before the content unless `add_newline` is false.
pub async fn append_to_file(
    session: &Session,
    path: &str,
    content: &str,
    add_newline: bool,
) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    info!(path = ?absolute, bytes = content.len(), "Appending to file");
    envelope(append_file(&absolute, content, add_newline), cwd)
}

/// Reads a file; the content travels back in `stdout`.
pub async fn read_file(session: &Session, path: &str) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    debug!(path = ?absolute, "Reading file");
    let outcome = fs::read_to_string(&absolute).map_err(ToolError::from);
    envelope(outcome, cwd)
}

/// Deletes a single file.
pub async fn delete_file(session: &Session, path: &str) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    info!(path = ?absolute, "Deleting file");
    envelope(remove_file_checked(&absolute), cwd)
}

/// Copies one file, creating the destination's parent directories.
pub async fn copy_file(session: &Session, source: &str, destination: &str) -> CommandResult {
    let cwd = session.working_directory();
    let src = cwd.join(source);
    let dst = cwd.join(destination);
    info!(from = ?src, to = ?dst, "Copying file");
    envelope(copy_file_checked(&src, &dst), cwd)
}

/// Recursively copies a directory. The destination must not exist yet.
pub async fn copy_directory(session: &Session, source: &str, destination: &str) -> CommandResult {
    let cwd = session.working_directory();
    let src = cwd.join(source);
    let dst = cwd.join(destination);
    info!(from = ?src, to = ?dst, "Copying directory");
    envelope(copy_directory_checked(&src, &dst), cwd)
}

/// Deletes a directory; `recursive` removes its contents too.
pub async fn delete_directory(session: &Session, path: &str, recursive: bool) -> CommandResult {
    let cwd = session.working_directory();
    let absolute = cwd.join(path);
    info!(path = ?absolute, recursive, "Deleting directory");
    envelope(remove_directory_checked(&absolute, recursive), cwd)
}

/// Moves (renames) a file or directory, falling back to copy-and-delete when
/// the rename crosses filesystems.
pub async fn move_path(session: &Session, source: &str, destination: &str) -> CommandResult {
    let cwd = session.working_directory();
    let src = cwd.join(source);
    let dst = cwd.join(destination);
    info!(from = ?src, to = ?dst, "Moving path");
    envelope(move_path_checked(&src, &dst), cwd)
}

/// Lists directory contents relative to the session, respecting gitignore
/// rules. Directories are suffixed with `/`; `max_depth` of `None` lists
/// immediate contents only.
pub fn list_directory(
    session: &Session,
    path: &str,
    show_hidden: bool,
    max_depth: Option<usize>,
) -> CommandResult {
    let cwd = session.working_directory();
    let start = cwd.join(path);
    debug!(path = ?start, show_hidden, ?max_depth, "Listing directory");
    envelope(list_directory_contents(&start, show_hidden, max_depth), cwd)
}

/// Finds files whose names match a glob pattern, relative to the session.
pub fn find_files(
    session: &Session,
    pattern: &str,
    search_path: &str,
    recursive: bool,
    case_sensitive: bool,
) -> CommandResult {
    let cwd = session.working_directory();
    debug!(pattern, search_path, recursive, case_sensitive, "Finding files");
    envelope(
        find_files_in(&cwd, pattern, search_path, recursive, case_sensitive),
        cwd.clone(),
    )
}

/// Searches for a substring inside files matching a name pattern. Hits are
/// reported as `path:line: text`.
pub fn search_in_files(
    session: &Session,
    search_text: &str,
    file_pattern: &str,
    search_path: &str,
    case_sensitive: bool,
    recursive: bool,
) -> CommandResult {
    let cwd = session.working_directory();
    debug!(search_text, file_pattern, search_path, "Searching in files");
    envelope(
        search_files_in(&cwd, search_text, file_pattern, search_path, case_sensitive, recursive),
        cwd.clone(),
    )
}

fn ensure_parent(path: &Path) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn write_file(absolute: &Path, content: &str) -> Result<String, ToolError> {
    ensure_parent(absolute)?;
    fs::write(absolute, content)?;
    Ok(format!("File '{}' created successfully.", absolute.display()))
}

fn append_file(absolute: &Path, content: &str, add_newline: bool) -> Result<String, ToolError> {
    ensure_parent(absolute)?;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(absolute)?;
    if add_newline {
        file.write_all(b"\n")?;
    }
    file.write_all(content.as_bytes())?;
    Ok(format!("Content appended to '{}' successfully.", absolute.display()))
}

fn remove_file_checked(absolute: &Path) -> Result<String, ToolError> {
    if !absolute.exists() {
        return Err(ToolError::NotFound(absolute.to_path_buf()));
    }
    if absolute.is_dir() {
        return Err(ToolError::IsADirectory(absolute.to_path_buf()));
    }
    fs::remove_file(absolute)?;
    Ok(format!("File '{}' deleted successfully.", absolute.display()))
}

fn copy_file_checked(src: &Path, dst: &Path) -> Result<String, ToolError> {
    if !src.exists() {
        return Err(ToolError::NotFound(src.to_path_buf()));
    }
    if src.is_dir() {
        return Err(ToolError::IsADirectory(src.to_path_buf()));
    }
    ensure_parent(dst)?;
    fs::copy(src, dst)?;
    Ok(format!(
        "File copied from '{}' to '{}' successfully.",
        src.display(),
        dst.display()
    ))
}

fn copy_directory_checked(src: &Path, dst: &Path) -> Result<String, ToolError> {
    if !src.exists() {
        return Err(ToolError::NotFound(src.to_path_buf()));
    }
    if !src.is_dir() {
        return Err(ToolError::NotADirectory(src.to_path_buf()));
    }
    if dst.exists() {
        return Err(ToolError::DestinationExists(dst.to_path_buf()));
    }
    copy_dir_recursive(src, dst)?;
    Ok(format!(
        "Directory copied from '{}' to '{}' successfully.",
        src.display(),
        dst.display()
    ))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), ToolError> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_directory_checked(absolute: &Path, recursive: bool) -> Result<String, ToolError> {
    if !absolute.exists() {
        return Err(ToolError::NotFound(absolute.to_path_buf()));
    }
    if !absolute.is_dir() {
        return Err(ToolError::NotADirectory(absolute.to_path_buf()));
    }
    if recursive {
        fs::remove_dir_all(absolute)?;
        Ok(format!(
            "Directory '{}' and all its contents deleted successfully.",
            absolute.display()
        ))
    } else {
        fs::remove_dir(absolute)?;
        Ok(format!("Directory '{}' deleted successfully.", absolute.display()))
    }
}

fn move_path_checked(src: &Path, dst: &Path) -> Result<String, ToolError> {
    if !src.exists() {
        return Err(ToolError::NotFound(src.to_path_buf()));
    }
    ensure_parent(dst)?;
    if fs::rename(src, dst).is_err() {
        // Likely a cross-device rename; copy over then delete the source.
        if src.is_dir() {
            copy_dir_recursive(src, dst)?;
            fs::remove_dir_all(src)?;
        } else {
            fs::copy(src, dst)?;
            fs::remove_file(src)?;
        }
    }
    Ok(format!(
        "'{}' moved to '{}' successfully.",
        src.display(),
        dst.display()
    ))
}

fn list_directory_contents(
    start: &Path,
    show_hidden: bool,
    max_depth: Option<usize>,
) -> Result<String, ToolError> {
    if !start.exists() {
        return Err(ToolError::NotFound(start.to_path_buf()));
    }
    if !start.is_dir() {
        return Err(ToolError::NotADirectory(start.to_path_buf()));
    }

    let mut walker_builder = WalkBuilder::new(start);
    walker_builder
        .hidden(!show_hidden)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .parents(true)
        .max_depth(Some(max_depth.unwrap_or(1)));

    let mut entries = Vec::new();
    for result in walker_builder.build() {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(start)
                    .unwrap_or_else(|_| entry.path());
                let mut line = relative.display().to_string();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    line.push('/');
                }
                entries.push(line);
            }
            Err(err) => {
                debug!("Warning during directory walk: {}", err);
            }
        }
    }

    entries.sort();
    if entries.is_empty() {
        Ok("Directory is empty".to_string())
    } else {
        Ok(entries.join("\n"))
    }
}

fn find_files_in(
    cwd: &Path,
    pattern: &str,
    search_path: &str,
    recursive: bool,
    case_sensitive: bool,
) -> Result<String, ToolError> {
    let root = cwd.join(search_path);
    if !root.exists() {
        return Err(ToolError::NotFound(root));
    }
    let glob = Pattern::new(pattern)
        .map_err(|e| ToolError::InvalidArgument(format!("Invalid glob pattern '{}': {}", pattern, e)))?;
    let options = MatchOptions {
        case_sensitive,
        ..MatchOptions::new()
    };

    let mut matches = Vec::new();
    for entry in plain_walker(&root, recursive).build() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if glob.matches_with(&name, options) {
            matches.push(display_relative(entry.path(), cwd));
        }
    }

    matches.sort();
    if matches.is_empty() {
        Ok("No files found matching the pattern.".to_string())
    } else {
        Ok(matches.join("\n"))
    }
}

fn search_files_in(
    cwd: &Path,
    search_text: &str,
    file_pattern: &str,
    search_path: &str,
    case_sensitive: bool,
    recursive: bool,
) -> Result<String, ToolError> {
    let root = cwd.join(search_path);
    if !root.exists() {
        return Err(ToolError::NotFound(root));
    }
    let glob = Pattern::new(file_pattern).map_err(|e| {
        ToolError::InvalidArgument(format!("Invalid glob pattern '{}': {}", file_pattern, e))
    })?;
    let options = MatchOptions::new();
    let needle = if case_sensitive {
        search_text.to_string()
    } else {
        search_text.to_lowercase()
    };

    let mut results = Vec::new();
    for entry in plain_walker(&root, recursive).build() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !glob.matches_with(&entry.file_name().to_string_lossy(), options) {
            continue;
        }
        // Unreadable or binary files are skipped, not reported.
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let relative = display_relative(entry.path(), cwd);
        for (index, line) in content.lines().enumerate() {
            let haystack = if case_sensitive {
                line.to_string()
            } else {
                line.to_lowercase()
            };
            if haystack.contains(&needle) {
                results.push(format!("{}:{}: {}", relative, index + 1, line.trim_end()));
            }
        }
    }

    if results.is_empty() {
        Ok(format!(
            "No matches found for '{}' in files matching '{}'",
            search_text, file_pattern
        ))
    } else {
        Ok(format!("Found {} matches:\n{}", results.len(), results.join("\n")))
    }
}

/// A walker with all ignore filtering disabled; find/search look at
/// everything under the root, hidden files included.
fn plain_walker(root: &Path, recursive: bool) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false);
    if !recursive {
        builder.max_depth(Some(1));
    }
    builder
}

fn display_relative(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session_in_tempdir() -> (tempfile::TempDir, Session) {
        let dir = tempdir().unwrap();
        let session = Session::with_dir(dir.path());
        (dir, session)
    }

    #[tokio::test]
    async fn create_and_read_file_round_trip() {
        let (dir, session) = session_in_tempdir();
        let result = create_file(&session, "nested/notes.txt", "hello tools").await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert!(dir.path().join("nested/notes.txt").exists());

        let result = read_file(&session, "nested/notes.txt").await;
        assert!(result.success);
        assert_eq!(result.stdout, "hello tools");
        assert_eq!(result.current_directory, dir.path());
    }

    #[tokio::test]
    async fn read_missing_file_reports_failure_envelope() {
        let (_dir, session) = session_in_tempdir();
        let result = read_file(&session, "nope.txt").await;
        assert!(!result.success);
        assert_eq!(result.returncode, 1);
        assert!(!result.stderr.is_empty());
    }

    #[tokio::test]
    async fn append_adds_newline_by_default() {
        let (dir, session) = session_in_tempdir();
        create_file(&session, "log.txt", "first").await;
        let result = append_to_file(&session, "log.txt", "second", true).await;
        assert!(result.success, "stderr: {}", result.stderr);
        let content = fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(content, "first\nsecond");
    }

    #[tokio::test]
    async fn delete_file_rejects_directories() {
        let (dir, session) = session_in_tempdir();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        let result = delete_file(&session, "subdir").await;
        assert!(!result.success);
        assert!(result.stderr.contains("is a directory"));
        assert!(dir.path().join("subdir").exists());
    }

    #[tokio::test]
    async fn copy_file_creates_destination_parents() {
        let (dir, session) = session_in_tempdir();
        create_file(&session, "a.txt", "payload").await;
        let result = copy_file(&session, "a.txt", "deep/b.txt").await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(fs::read_to_string(dir.path().join("deep/b.txt")).unwrap(), "payload");
    }

    #[tokio::test]
    async fn copy_directory_refuses_existing_destination() {
        let (dir, session) = session_in_tempdir();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/f.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("dst")).unwrap();

        let result = copy_directory(&session, "src", "dst").await;
        assert!(!result.success);
        assert!(result.stderr.contains("already exists"));
    }

    #[tokio::test]
    async fn copy_directory_is_recursive() {
        let (dir, session) = session_in_tempdir();
        fs::create_dir_all(dir.path().join("src/inner")).unwrap();
        fs::write(dir.path().join("src/inner/f.txt"), "deep").unwrap();

        let result = copy_directory(&session, "src", "dst").await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(
            fs::read_to_string(dir.path().join("dst/inner/f.txt")).unwrap(),
            "deep"
        );
    }

    #[tokio::test]
    async fn delete_directory_requires_recursive_for_contents() {
        let (dir, session) = session_in_tempdir();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full/f.txt"), "x").unwrap();

        let result = delete_directory(&session, "full", false).await;
        assert!(!result.success);
        assert!(dir.path().join("full").exists());

        let result = delete_directory(&session, "full", true).await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert!(!dir.path().join("full").exists());
    }

    #[tokio::test]
    async fn move_path_renames_files() {
        let (dir, session) = session_in_tempdir();
        create_file(&session, "old.txt", "data").await;
        let result = move_path(&session, "old.txt", "new/renamed.txt").await;
        assert!(result.success, "stderr: {}", result.stderr);
        assert!(!dir.path().join("old.txt").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("new/renamed.txt")).unwrap(),
            "data"
        );
    }

    #[test]
    fn list_directory_marks_directories() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join("f1.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sd")).unwrap();

        let result = list_directory(&session, ".", false, None);
        assert!(result.success, "stderr: {}", result.stderr);
        let mut lines: Vec<&str> = result.stdout.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["f1.txt", "sd/"]);
    }

    #[test]
    fn list_directory_hides_dotfiles_unless_asked() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join("seen.txt"), "").unwrap();

        let result = list_directory(&session, ".", false, None);
        assert!(!result.stdout.contains(".hidden"));

        let result = list_directory(&session, ".", true, None);
        assert!(result.stdout.contains(".hidden"));
    }

    #[test]
    fn list_directory_on_file_is_an_error() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join("f.txt"), "").unwrap();
        let result = list_directory(&session, "f.txt", false, None);
        assert!(!result.success);
        assert!(result.stderr.contains("not a directory"));
    }

    #[test]
    fn find_files_matches_globs_recursively() {
        let (dir, session) = session_in_tempdir();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::write(dir.path().join("sub/b.rs"), "").unwrap();
        fs::write(dir.path().join("sub/c.txt"), "").unwrap();

        let result = find_files(&session, "*.rs", ".", true, true);
        assert!(result.success, "stderr: {}", result.stderr);
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(result.stdout.contains("a.rs"));
        assert!(!result.stdout.contains("c.txt"));

        let result = find_files(&session, "*.rs", ".", false, true);
        assert_eq!(result.stdout.lines().count(), 1);
    }

    #[test]
    fn find_files_can_ignore_case() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join("README.MD"), "").unwrap();

        let result = find_files(&session, "*.md", ".", true, true);
        assert_eq!(result.stdout, "No files found matching the pattern.");

        let result = find_files(&session, "*.md", ".", true, false);
        assert!(result.stdout.contains("README.MD"));
    }

    #[test]
    fn search_in_files_reports_line_numbers() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join("log.txt"), "alpha\nbeta target beta\ngamma\n").unwrap();

        let result = search_in_files(&session, "target", "*.txt", ".", true, true);
        assert!(result.success, "stderr: {}", result.stderr);
        assert!(result.stdout.starts_with("Found 1 matches:"));
        assert!(result.stdout.contains("log.txt:2: beta target beta"));
    }

    #[test]
    fn search_in_files_case_insensitive() {
        let (dir, session) = session_in_tempdir();
        fs::write(dir.path().join("n.txt"), "Needle here\n").unwrap();

        let result = search_in_files(&session, "needle", "*", ".", true, true);
        assert!(result.stdout.starts_with("No matches found"));

        let result = search_in_files(&session, "needle", "*", ".", false, true);
        assert!(result.stdout.contains("n.txt:1: Needle here"));
    }

    #[test]
    fn search_path_must_exist() {
        let (_dir, session) = session_in_tempdir();
        let result = search_in_files(&session, "x", "*", "missing_dir", true, true);
        assert!(!result.success);
        assert!(result.stderr.contains("does not exist"));
    }
}
