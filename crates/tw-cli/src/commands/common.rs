//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use tw_apply::{ApplyResult, Reporter, RunSummary, StatementOutcome};
use tw_core::{ConnectionConfig, ConnectionSettings, DbType, FailurePolicy, Profile};
use tw_db::Database;
use tw_sql::preview;

use crate::cli::GlobalArgs;

/// Preview length for dry-run listings
const LISTING_PREVIEW_CHARS: usize = 60;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that the connection is closed before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: this is control flow, not a message for stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Backend selected by the global flags
pub(crate) fn db_type(global: &GlobalArgs) -> DbType {
    global.backend.into()
}

/// Resolve the connection configuration from flags and `DB_*` variables
pub(crate) fn connection_config(global: &GlobalArgs) -> Result<ConnectionConfig> {
    let profile = Profile::from(global.profile);
    let config = ConnectionSettings::from(&global.connection)
        .resolve(db_type(global), profile)
        .context("Invalid connection configuration")?;
    if global.verbose {
        eprintln!("[verbose] Profile {profile}, target {}", config.target());
    }
    Ok(config)
}

/// Validate configuration and open the single connection for this run
pub(crate) async fn open_database(global: &GlobalArgs) -> Result<Box<dyn Database>> {
    let config = connection_config(global)?;
    println!("Connecting to {}...", config.target());
    let db = tw_db::connect(&config)
        .await
        .context("Failed to connect to database")?;
    println!("Connected.\n");
    Ok(db)
}

/// Prints one line per statement as the applier reports it
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn script_started(&self, name: &str, policy: FailurePolicy, statements: usize) {
        println!("\n{name}: {statements} statements (policy: {policy})");
    }

    fn statement_finished(&self, result: &ApplyResult) {
        let line = &result.preview;
        match (&result.outcome, &result.error) {
            (StatementOutcome::Applied, _) => println!("  ✓ [{}] {}", result.index, line),
            (StatementOutcome::SkippedGuard(guard), _) => {
                println!("  ⚠ [{}] {} - {} already exists", result.index, line, guard)
            }
            (StatementOutcome::SkippedAlreadyExists(kind), _) => {
                println!("  ⚠ [{}] {} - skipped, {}", result.index, line, kind)
            }
            (StatementOutcome::Failed, Some(error)) => {
                println!("  ✗ [{}] {} - {}", result.index, line, error)
            }
            (StatementOutcome::Failed, None) => println!("  ✗ [{}] {}", result.index, line),
        }
        if self.verbose {
            eprintln!(
                "[verbose] statement {} took {}ms",
                result.index,
                result.duration.as_millis()
            );
        }
    }
}

/// Print statements without executing them
pub(crate) fn print_statements<'a>(statements: impl IntoIterator<Item = (usize, &'a str)>) {
    for (index, sql) in statements {
        println!("  [{index}] {}", preview(sql, LISTING_PREVIEW_CHARS));
    }
}

/// Print the closing summary block
pub(crate) fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "Summary: {} attempted, {} applied, {} skipped, {} failed",
        summary.attempted, summary.applied, summary.skipped, summary.failed
    );
    if summary.aborted {
        println!("Run aborted at the first unclassified failure.");
    }
}

/// Exit status for a run that finished without aborting
pub(crate) fn finish(summary: &RunSummary, strict_exit: bool) -> Result<()> {
    if summary.failed > 0 {
        if strict_exit {
            return Err(ExitCode(1).into());
        }
        println!("Completed with {} failed statements.", summary.failed);
    } else {
        println!("Completed successfully.");
    }
    Ok(())
}
