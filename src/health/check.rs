//! Core check types

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::checks;
use super::context::CheckContext;

/// Human-readable description of one failed precondition
///
/// May carry lightweight HTML markup (`<i>`, `<br>`); the terminal reporter
/// and the log print it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorMessage(String);

impl ErrorMessage {
    /// Creates a message from any text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the message text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for a message with no text at all
    ///
    /// Whitespace-only messages are kept.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the message, returning its text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ErrorMessage {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for ErrorMessage {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl PartialEq<&str> for ErrorMessage {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Unexpected fault while executing a check
///
/// Expected failures (service down, file missing) are messages, not errors.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("could not read {}: {source}", .path.display())]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Status of a check after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// No preconditions failed
    Pass,
    /// One or more preconditions failed
    Fail,
    /// The check itself could not be executed
    Error,
}

impl CheckStatus {
    /// Returns true if the check passed
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    /// Returns true if the check failed or could not run
    pub fn is_fail(&self) -> bool {
        !self.is_ok()
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => "PASS".green().to_string(),
            CheckStatus::Fail => "FAIL".red().to_string(),
            CheckStatus::Error => "ERROR".magenta().to_string(),
        }
    }
}

/// The startup checks known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// `SELECT version()` against the configured database
    Database,
    /// Authenticated GET against the Patavi companion service
    Patavi,
    /// Presence of the server-side key, certificate and CA files
    Certificates,
    /// Single connection attempt to the message broker
    Broker,
}

impl Check {
    pub fn name(&self) -> &'static str {
        match self {
            Check::Database => "Database",
            Check::Patavi => "Patavi",
            Check::Certificates => "Certificates",
            Check::Broker => "Broker",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Check::Database => "Runs a version query against the configured database",
            Check::Patavi => "Verifies credentials and reachability of the Patavi server",
            Check::Certificates => "Verifies the server key, certificate and CA files exist",
            Check::Broker => "Opens a connection to the AMQP broker",
        }
    }

    /// Runs the check, returning the failed preconditions it detected
    pub async fn run(&self, ctx: &CheckContext) -> Result<Vec<ErrorMessage>, CheckError> {
        match self {
            Check::Database => checks::database::run(ctx).await,
            Check::Patavi => checks::patavi::run(ctx).await,
            Check::Certificates => checks::certificates::run(ctx).await,
            Check::Broker => checks::broker::run(ctx).await,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one check within a diagnostics run
#[derive(Debug, Clone)]
pub struct CheckRecord {
    pub check: Check,
    pub status: CheckStatus,
    /// Failed preconditions, in the order the check reported them
    pub messages: Vec<ErrorMessage>,
    /// Description of the fault when `status` is `Error`
    pub fault: Option<String>,
    pub duration: Duration,
}

impl CheckRecord {
    /// Record for a check that ran to completion
    pub fn completed(check: Check, messages: Vec<ErrorMessage>, duration: Duration) -> Self {
        let status = if messages.iter().all(ErrorMessage::is_empty) {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self {
            check,
            status,
            messages,
            fault: None,
            duration,
        }
    }

    /// Record for a check that faulted before producing a result
    pub fn faulted(check: Check, fault: impl Into<String>, duration: Duration) -> Self {
        Self {
            check,
            status: CheckStatus::Error,
            messages: Vec::new(),
            fault: Some(fault.into()),
            duration,
        }
    }
}
