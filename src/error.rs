//! Errors surfaced to the caller of a diagnostics run
//!
//! Check failures are never errors at this level; they become messages in
//! the report. Only misuse of the entry points ends up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// The application name does not match any registered application
    #[error("unknown application {name:?}, expected one of: {expected}")]
    UnknownApplication { name: String, expected: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}
