//! Runs an application's checks concurrently and aggregates the outcome

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, error, info};

use super::check::{Check, CheckError, CheckRecord, CheckStatus, ErrorMessage};
use super::context::CheckContext;
use super::registry::{ApplicationId, checks_for};
use super::reporter::render_error_page;

pub const UNKNOWN_ERROR_PREFIX: &str = "Could not execute diagnostics, unknown error: ";

/// Flattens per-check message lists into one list, dropping empty messages
///
/// Order follows the input order, then the order within each list.
pub fn aggregate<I>(results: I) -> Vec<ErrorMessage>
where
    I: IntoIterator<Item = Vec<ErrorMessage>>,
{
    results
        .into_iter()
        .flatten()
        .filter(|message| !message.is_empty())
        .collect()
}

/// Outcome of one diagnostics run
#[derive(Debug, Clone)]
pub struct DiagnosticsReport {
    pub app: ApplicationId,
    /// One record per check, in registry order
    pub records: Vec<CheckRecord>,
    /// Description of the first check that could not be executed
    pub hard_failure: Option<String>,
    /// Wall-clock time of the whole run
    pub duration: Duration,
}

impl DiagnosticsReport {
    /// Every error of the run, in check order, followed by the synthetic
    /// unknown-error message when a check could not be executed
    pub fn errors(&self) -> Vec<ErrorMessage> {
        let mut errors = aggregate(self.records.iter().map(|record| record.messages.clone()));
        if let Some(fault) = &self.hard_failure {
            errors.push(ErrorMessage::new(format!("{UNKNOWN_ERROR_PREFIX}{fault}")));
        }
        errors
    }

    /// Returns true if the application may start
    pub fn is_clean(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// 0 = clean, 1 = any error
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() { 0 } else { 1 }
    }

    /// Rendered HTML error page, or `None` when the run is clean
    pub fn error_page(&self) -> Option<String> {
        let errors = self.errors();
        if errors.is_empty() {
            None
        } else {
            Some(render_error_page(self.app, &errors))
        }
    }
}

/// Runs startup checks against a shared context
pub struct DiagnosticsRunner {
    context: CheckContext,
}

impl DiagnosticsRunner {
    pub fn new(context: CheckContext) -> Self {
        Self { context }
    }

    /// Runs the registered checks for `app`
    pub async fn run(&self, app: ApplicationId) -> DiagnosticsReport {
        self.run_checks(app, checks_for(app)).await
    }

    /// Runs `checks` concurrently and waits for all of them
    ///
    /// A check that errors or panics is recorded as a hard failure; the
    /// other checks still complete and keep their messages.
    pub async fn run_checks(&self, app: ApplicationId, checks: &[Check]) -> DiagnosticsReport {
        info!(%app, checks = checks.len(), "Running startup diagnostics");
        let start = Instant::now();

        let handles: Vec<_> = checks
            .iter()
            .map(|&check| {
                let ctx = self.context.clone();
                tokio::spawn(async move {
                    let started = Instant::now();
                    let result = check.run(&ctx).await;
                    (result, started.elapsed())
                })
            })
            .collect();

        // join_all yields in dispatch order, whatever order the tasks finish in
        let outcomes = join_all(handles).await;

        let mut records = Vec::with_capacity(checks.len());
        let mut hard_failure = None;
        for (&check, outcome) in checks.iter().zip(outcomes) {
            let record = match outcome {
                Ok((Ok(messages), duration)) => CheckRecord::completed(check, messages, duration),
                Ok((Err(e), duration)) => fault_record(check, e, duration),
                Err(join_error) => fault_record(check, CheckError::from(join_error), start.elapsed()),
            };
            if let Some(fault) = &record.fault {
                hard_failure.get_or_insert_with(|| fault.clone());
            }
            records.push(record);
        }

        let report = DiagnosticsReport {
            app,
            records,
            hard_failure,
            duration: start.elapsed(),
        };

        let errors = report.errors();
        for message in &errors {
            error!("{message}");
        }
        if errors.is_empty() {
            info!(%app, elapsed = ?report.duration, "Startup diagnostics passed");
        }

        report
    }
}

fn fault_record(check: Check, error: CheckError, duration: Duration) -> CheckRecord {
    debug!(check = %check, error = %error, "Check could not be executed");
    CheckRecord::faulted(check, error.to_string(), duration)
}
