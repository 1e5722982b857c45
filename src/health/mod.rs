//! Startup diagnostics: checks run before an application serves traffic
//!
//! Each application has a fixed, ordered list of checks (database, companion
//! service, certificates, message broker). All checks of a run execute
//! concurrently; their messages are merged in check order into one report.
//!
//! # Example
//!
//! ```no_run
//! use startup_diagnostics::DiagnosticsConfig;
//! use startup_diagnostics::health::{self, CheckContext};
//!
//! # async fn start() -> Result<(), startup_diagnostics::DiagnosticsError> {
//! let context = CheckContext::from_config(DiagnosticsConfig::load_from_env()?);
//!
//! match health::run_startup_diagnostics("MCDA", &context).await? {
//!     None => println!("All systems operational!"),
//!     Some(page) => eprintln!("{page}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod checks;
pub mod context;
pub mod registry;
pub mod reporter;
pub mod runner;

pub use check::{Check, CheckError, CheckRecord, CheckStatus, ErrorMessage};
pub use context::{
    BrokerConnector, CheckContext, ClientIdentity, Database, PgDatabase, ReqwestServiceClient,
    ServiceClient, ServiceCredentials, ServiceRequest, TcpBrokerConnector,
};
pub use registry::{ApplicationId, checks_for, get_checks};
pub use reporter::{format_report, print_report, render_error_page};
pub use runner::{DiagnosticsReport, DiagnosticsRunner, aggregate};

use crate::error::DiagnosticsError;

/// Runs the startup checks of the application called `app_name`
///
/// Returns `Ok(None)` when the application may start and `Ok(Some(page))`
/// with the rendered error page otherwise. Unknown names are an error.
pub async fn run_startup_diagnostics(
    app_name: &str,
    context: &CheckContext,
) -> Result<Option<String>, DiagnosticsError> {
    let app: ApplicationId = app_name.parse()?;
    let report = DiagnosticsRunner::new(context.clone()).run(app).await;
    Ok(report.error_page())
}
