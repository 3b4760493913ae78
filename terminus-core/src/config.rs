// terminus-core/src/config.rs

//! Runtime configuration for the tool surface.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Settings shared by every command execution.
#[derive(Deserialize, Debug, Clone)]
pub struct TerminalConfig {
    /// Seconds a spawned command may run before it is killed and reported as
    /// timed out.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Extra encoding labels tried, in order, before the host-locale and
    /// built-in candidates when decoding command output.
    #[serde(default)]
    pub encoding_candidates: Vec<String>,
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            encoding_candidates: Vec::new(),
        }
    }
}

impl TerminalConfig {
    /// Parses and validates configuration from TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TerminalConfig = match toml::from_str(content) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };

        if config.command_timeout_secs == 0 {
            return Err(anyhow!("'command_timeout_secs' must be greater than zero."));
        }
        for label in &config.encoding_candidates {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(anyhow!(
                    "Unknown encoding label '{}' in 'encoding_candidates'.",
                    label
                ));
            }
        }

        Ok(config)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
