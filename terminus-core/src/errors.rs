// terminus-core/src/errors.rs
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside tool implementations.
///
/// These never cross the tool boundary directly; each public tool folds them
/// into the `stderr`/`returncode` fields of a `CommandResult`.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Underlying filesystem or OS error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A path the operation requires does not exist.
    #[error("Path '{}' does not exist.", .0.display())]
    NotFound(PathBuf),

    /// A directory was expected.
    #[error("'{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    /// A file was expected.
    #[error("'{}' is a directory, not a file.", .0.display())]
    IsADirectory(PathBuf),

    /// The destination of a copy already exists.
    #[error("Destination '{}' already exists.", .0.display())]
    DestinationExists(PathBuf),

    /// A command line could not be split into shell words.
    #[error("Failed to parse command line: {0}")]
    Parse(String),

    /// A tool argument is malformed (e.g. an environment variable name
    /// containing `=`).
    #[error("{0}")]
    InvalidArgument(String),
}
