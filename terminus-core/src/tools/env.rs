// terminus-core/src/tools/env.rs

//! Environment-variable tools.
//!
//! Writes never touch the real process environment: `std::env::set_var` is
//! unsound while other threads may be reading the environment, and every
//! concurrent spawn does exactly that. Variables set here live on the
//! [`Session`] and are layered onto the child environment at launch.

use std::collections::HashMap;

use tracing::info;

use crate::errors::ToolError;
use crate::session::Session;
use crate::tools::{envelope, CommandResult};

/// Lists environment variables as sorted `KEY=value` lines, optionally
/// filtered by a case-insensitive substring of the name. Session overrides
/// shadow process variables of the same name.
pub fn get_environment_variables(session: &Session, filter: &str) -> CommandResult {
    let cwd = session.working_directory();
    let filter_lower = filter.to_lowercase();

    let mut vars: HashMap<String, String> = std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    vars.extend(session.environment_overrides());

    let mut lines: Vec<String> = vars
        .into_iter()
        .filter(|(key, _)| filter.is_empty() || key.to_lowercase().contains(&filter_lower))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    lines.sort();

    let output = if lines.is_empty() {
        if filter.is_empty() {
            "No environment variables found".to_string()
        } else {
            format!("No environment variables found matching '{}'", filter)
        }
    } else {
        let suffix = if lines.len() == 1 { "" } else { "s" };
        let scope = if filter.is_empty() {
            String::new()
        } else {
            format!(" matching '{}'", filter)
        };
        format!(
            "Found {} environment variable{}{}:\n{}",
            lines.len(),
            suffix,
            scope,
            lines.join("\n")
        )
    };

    CommandResult::ok(output, cwd)
}

/// Sets an environment variable for the session; subsequently launched
/// commands inherit it.
pub fn set_environment_variable(session: &Session, name: &str, value: &str) -> CommandResult {
    let cwd = session.working_directory();
    let outcome = if name.is_empty() || name.contains('=') || name.contains('\0') {
        Err(ToolError::InvalidArgument(format!(
            "Invalid environment variable name '{}'",
            name
        )))
    } else if value.contains('\0') {
        Err(ToolError::InvalidArgument(
            "Environment variable values cannot contain NUL bytes".to_string(),
        ))
    } else {
        info!(name, "Setting session environment variable");
        session.set_environment_override(name, value);
        Ok(format!("Environment variable '{}' set to '{}'", name, value))
    };
    envelope(outcome, cwd)
}
