// terminus-core/src/lib.rs

//! Terminus core: a host machine's shell and filesystem exposed as a set of
//! invokable tools.
//!
//! Three pieces collaborate:
//!
//! - [`exec`] runs a command through the platform shell, captures raw output
//!   bytes, and reports a structured [`CommandResult`]. It never returns an
//!   error: launch failures, timeouts and unparseable command lines all come
//!   back inside the result envelope.
//! - [`encoding`] turns those raw bytes into text via an ordered candidate
//!   chain that cannot fail.
//! - [`session`] carries the logical working directory across otherwise
//!   stateless tool calls; only a successful `cd` moves it.
//!
//! The [`tools`] module layers the user-facing operations on top: shell
//! execution with `cd` interception, file and directory CRUD, and
//! environment-variable access. Every tool returns the same
//! [`CommandResult`] envelope, so a hosting protocol layer can forward
//! results uniformly.

pub mod config;
pub mod encoding;
pub mod errors;
pub mod exec;
pub mod session;
pub mod tools;

pub use config::TerminalConfig;
pub use errors::ToolError;
pub use exec::{execute, CommandLine};
pub use session::Session;
pub use tools::CommandResult;
