//! dupescout - report-only duplicate file finder.
//!
//! Scans one or more directory trees and reports groups of files with
//! identical content, using staged hashing (size, 4 KiB prefix
//! fingerprint, full-content fingerprint) so that most files are never
//! read at all.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::Write;

use anyhow::Result;

use cli::Cli;
use duplicates::{DuplicateFinder, FinderConfig};
use error::ExitCode;
use output::{inverse_text, DuplicateReport, ReportOptions};

/// Run the application: scan, render to stdout, pick an exit code.
///
/// # Errors
///
/// Returns an error for an internal consistency violation in the grouping
/// pipeline or a failure writing the report; all environmental anomalies
/// are warnings that only influence the exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = FinderConfig::new(cli.roots_or_default())
        .with_ignore_dirs(cli.ignore_dirs.iter().cloned())
        .with_ignore_missing(cli.ignore_missing)
        .with_ignore_empty(cli.ignore_empty);
    let outcome = DuplicateFinder::new(config).scan()?;

    let text = if cli.inverse {
        inverse_text(&outcome.unique)
    } else {
        DuplicateReport::new(
            &outcome.groups,
            ReportOptions {
                ignore_contained: cli.ignore_contained.clone(),
            },
        )
        .to_text()
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;

    Ok(if outcome.stats.had_warnings() {
        ExitCode::PartialSuccess
    } else if outcome.groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    })
}
