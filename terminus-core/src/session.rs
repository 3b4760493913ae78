// terminus-core/src/session.rs

//! Session-scoped working-directory state.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

/// The authoritative working directory for one logical session.
///
/// Individual tool calls are stateless; this cell is what threads a `cd`
/// forward into subsequent calls. Tools read a snapshot and resolve relative
/// paths against it; only the directory-change tool writes, and only after
/// the underlying command succeeded. The lock keeps concurrent tool dispatch
/// from corrupting the path, and a hosting process serving several clients
/// can simply hold one `Session` per connection.
#[derive(Debug)]
pub struct Session {
    current_dir: RwLock<PathBuf>,
    env_overrides: RwLock<HashMap<String, String>>,
}

impl Session {
    /// Creates a session rooted at the real process working directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_dir(std::env::current_dir()?))
    }

    /// Creates a session rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: RwLock::new(dir.into()),
            env_overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the tracked directory.
    pub fn working_directory(&self) -> PathBuf {
        self.current_dir.read().unwrap().clone()
    }

    /// Replaces the tracked directory with the result of a successful
    /// directory change.
    pub fn set_working_directory(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        debug!(new_dir = ?dir, "Updating session working directory");
        *self.current_dir.write().unwrap() = dir;
    }

    /// Snapshot of the session's environment-variable overrides.
    pub fn environment_overrides(&self) -> HashMap<String, String> {
        self.env_overrides.read().unwrap().clone()
    }

    /// Stores a variable that subsequently launched commands receive on top
    /// of the process environment. Session-scoped rather than written into
    /// the real process environment: `std::env::set_var` is unsound while
    /// other threads may be reading the environment, which every spawn does.
    pub fn set_environment_override(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        debug!(name, "Updating session environment override");
        self.env_overrides.write().unwrap().insert(name, value.into());
    }
}
