//! Apply command implementation

use anyhow::{Context, Result};
use tw_apply::{Applier, ApplyError};
use tw_core::{CommentMode, FailurePolicy};
use tw_sql::{split_statements, StatementBatch};

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{self, ConsoleReporter};

/// Execute the apply command
pub async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let policy = FailurePolicy::from(args.policy);
    let batch = load_batch(args, global)?;

    if args.dry_run {
        println!("{} statements (dry run, nothing executed):\n", batch.len());
        common::print_statements(batch.iter().map(|s| (s.index, s.sql.as_str())));
        return Ok(());
    }

    if batch.is_empty() {
        println!("No statements found.");
        return Ok(());
    }

    let db = common::open_database(global).await?;
    let reporter = ConsoleReporter::new(global.verbose);
    println!("Applying {} statements (policy: {policy})", batch.len());

    let outcome = Applier::new(db.as_ref(), policy)
        .with_reporter(&reporter)
        .apply_batch(&batch)
        .await;
    db.close().await;

    match outcome {
        Ok(report) => {
            common::print_summary(&report.summary);
            common::finish(&report.summary, args.strict_exit)
        }
        Err(err) => {
            if let ApplyError::Aborted { report, .. } = &err {
                common::print_summary(&report.summary);
            }
            Err(err.into())
        }
    }
}

/// Read the SQL source and split it into statements
fn load_batch(args: &ApplyArgs, global: &GlobalArgs) -> Result<StatementBatch> {
    let sql = match (&args.file, &args.sql) {
        (_, Some(sql)) => sql.clone(),
        (Some(path), None) => {
            if global.verbose {
                eprintln!("[verbose] Reading {}", path.display());
            }
            tw_core::read_sql_file(path)?
        }
        (None, None) => anyhow::bail!("Either a SQL file or --sql is required"),
    };

    let mode = if args.strip_comments {
        CommentMode::Strip
    } else {
        CommentMode::Keep
    };
    let batch = split_statements(&sql, common::db_type(global), mode)
        .context("Failed to split SQL into statements")?;
    log::debug!("Split source into {} statements", batch.len());
    Ok(batch)
}
