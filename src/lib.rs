//! Startup Diagnostics
//!
//! Fail-fast environment checks run before an application starts serving.

/// Build-time information (timestamp, target, rustc)
pub mod build_info;

/// Profile and environment configuration
pub mod config;

/// Errors returned by the diagnostics entry points
pub mod error;

/// Checks, registry, runner and reporting
pub mod health;

pub use config::DiagnosticsConfig;
pub use error::DiagnosticsError;
