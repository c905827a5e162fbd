use std::time::Duration;

use console::style;
use contentgen_core::{Action, RunReport};
use tracing::debug;

pub(crate) fn summary(action: Action, report: &RunReport, elapsed: Duration) {
    for path in &report.written {
        debug!(path = %path.display(), "Wrote file.");
    }

    for warning in &report.warnings {
        eprintln!("{} {warning}", style("warning:").yellow().bold());
    }
    for failure in &report.failures {
        eprintln!("{} {failure}", style("error:").red().bold());
    }

    let backups = if report.backups.is_empty() {
        String::new()
    } else {
        format!(", {} previous version(s) kept as .bak", report.backups.len())
    };
    let status = if report.is_success() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!(
        "{status} {action}: {} file(s) written{backups} in {}ms",
        report.written.len(),
        elapsed.as_millis()
    );
}

pub(crate) fn error(message: &str) {
    eprintln!("{} {message}", style("error:").red().bold());
}
