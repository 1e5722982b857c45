use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use startup_diagnostics::DiagnosticsConfig;
use startup_diagnostics::build_info;
use startup_diagnostics::health::{ApplicationId, CheckContext, DiagnosticsRunner, print_report};

/// Exit code for an application name that is not registered
const EXIT_UNKNOWN_APPLICATION: i32 = 2;

/// Runs the startup checks for an application and reports whether it may start
#[derive(Debug, Parser)]
#[command(name = "startup-diagnostics", version, long_version = build_info::DETAILED_INFO)]
struct Cli {
    /// Application to check (MCDA, GeMTC or Patavi)
    app: String,

    /// Configuration profile; defaults to DIAGNOSTICS_PROFILE or "release"
    #[arg(long)]
    profile: Option<String>,

    /// Print the HTML error page instead of the summary table
    #[arg(long)]
    html: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let app: ApplicationId = match cli.app.parse() {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Refusing to run diagnostics");
            std::process::exit(EXIT_UNKNOWN_APPLICATION);
        }
    };

    let config = match &cli.profile {
        Some(profile) => DiagnosticsConfig::load(profile),
        None => DiagnosticsConfig::load_from_env(),
    }
    .context("failed to load diagnostics configuration")?;

    info!(
        %app,
        profile = %config.profile,
        version = build_info::VERSION,
        "Starting startup diagnostics"
    );

    let report = DiagnosticsRunner::new(CheckContext::from_config(config))
        .run(app)
        .await;

    if cli.html {
        if let Some(page) = report.error_page() {
            println!("{page}");
        }
    } else {
        print_report(&report);
    }

    std::process::exit(report.exit_code());
}
