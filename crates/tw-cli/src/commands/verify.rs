//! Verify command implementation

use anyhow::Result;
use tw_apply::verify_tables;

use crate::cli::{GlobalArgs, VerifyArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the verify command
pub async fn execute(args: &VerifyArgs, global: &GlobalArgs) -> Result<()> {
    let db = common::open_database(global).await?;
    let outcome = verify_tables(db.as_ref(), &args.tables).await;
    db.close().await;
    let report = outcome?;

    for table in &report.present {
        println!("  ✓ {table}");
    }
    for table in &report.missing {
        println!("  ✗ {table} (missing)");
    }

    println!(
        "\n{} of {} tables present",
        report.present.len(),
        args.tables.len()
    );
    if !report.is_complete() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
