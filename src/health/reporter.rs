//! Formatting and reporting for diagnostics results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::{CheckStatus, ErrorMessage};
use super::registry::ApplicationId;
use super::runner::DiagnosticsReport;

/// Renders the HTML page served in place of the application when it cannot start
pub fn render_error_page(app: ApplicationId, errors: &[ErrorMessage]) -> String {
    let header = format!("<h3>{app} could not be started. The following errors occured:</h3>");
    errors.iter().fold(header, |mut page, error| {
        page.push_str(&format!("<div style=\"padding: 10px\">{error}</div>"));
        page
    })
}

/// Formats a diagnostics report as a pretty table
pub fn format_report(report: &DiagnosticsReport) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Check", "Status", "Duration", "Errors"]);

    for record in &report.records {
        let duration_str = format!("{:.2?}", record.duration);
        let error_count = match &record.fault {
            Some(_) => "-".to_string(),
            None => record.messages.len().to_string(),
        };
        builder.push_record([
            record.check.name(),
            &record.status.as_colored_str(),
            &duration_str,
            &error_count,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = String::new();
    output.push_str(&table.to_string());
    output.push('\n');

    output.push_str(&format_summary(report));

    output
}

fn format_summary(report: &DiagnosticsReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("\n{} {}\n", report.app.as_str().bold(), "diagnostics".bold()));
    summary.push_str(&format!("  Total checks: {}\n", report.total()));
    summary.push_str(&format!(
        "  {} Passed: {}\n",
        "✓".green(),
        report.count(CheckStatus::Pass)
    ));

    let failed = report.count(CheckStatus::Fail);
    if failed > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "✗".red(), failed));
    }

    let faulted = report.count(CheckStatus::Error);
    if faulted > 0 {
        summary.push_str(&format!("  {} Could not run: {}\n", "!".magenta(), faulted));
    }

    summary.push('\n');
    if report.is_clean() {
        summary.push_str(&format!("  {}\n", "Overall: READY TO START".green().bold()));
    } else {
        summary.push_str(&format!("  {}\n", "Overall: NOT STARTABLE".red().bold()));
    }

    summary
}

/// Prints a diagnostics report to stdout, followed by every error message
pub fn print_report(report: &DiagnosticsReport) {
    println!("{}", format_report(report));

    let errors = report.errors();
    if !errors.is_empty() {
        println!("{}", "Errors:".bold());
        for error in errors {
            println!("  - {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::health::check::{Check, CheckRecord};

    #[test]
    fn test_error_page_header_and_blocks() {
        let page = render_error_page(
            ApplicationId::Gemtc,
            &[ErrorMessage::new("first"), ErrorMessage::new("second")],
        );
        assert_eq!(
            page,
            "<h3>GeMTC could not be started. The following errors occured:</h3>\
             <div style=\"padding: 10px\">first</div>\
             <div style=\"padding: 10px\">second</div>"
        );
    }

    #[test]
    fn test_format_report_lists_every_check() {
        let report = DiagnosticsReport {
            app: ApplicationId::Patavi,
            records: vec![
                CheckRecord::completed(Check::Database, Vec::new(), Duration::from_millis(3)),
                CheckRecord::completed(
                    Check::Certificates,
                    vec!["missing".into(), "also missing".into()],
                    Duration::ZERO,
                ),
                CheckRecord::faulted(Check::Broker, "panicked", Duration::ZERO),
            ],
            hard_failure: Some("panicked".to_string()),
            duration: Duration::from_millis(3),
        };

        let output = format_report(&report);

        assert!(output.contains("Database"));
        assert!(output.contains("Certificates"));
        assert!(output.contains("Broker"));
        assert!(output.contains("Total checks: 3"));
        assert!(output.contains("Could not run: 1"));
        assert!(output.contains("NOT STARTABLE"));
    }
}
