//! Plan command implementation

use anyhow::{Context, Result};
use tw_apply::{prepare_plan, run_plan, ApplyError, PlanReport};
use tw_core::Plan;

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::common::{self, ConsoleReporter, ExitCode};

/// Execute the plan command
pub async fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let plan = Plan::load(&args.path).context("Failed to load plan")?;
    let db_type = common::db_type(global);

    if args.dry_run {
        let scripts = prepare_plan(&plan, db_type)?;
        for script in &scripts {
            println!(
                "\n{}: {} statements (policy: {})",
                script.name,
                script.steps.len(),
                script.policy
            );
            common::print_statements(
                script
                    .steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| (i + 1, step.sql.as_str())),
            );
        }
        if let Some(verify) = &plan.verify {
            println!("\nverify: {}", verify.tables.join(", "));
        }
        return Ok(());
    }

    let db = common::open_database(global).await?;
    let reporter = ConsoleReporter::new(global.verbose);
    println!("Running plan {} ({} scripts)", args.path.display(), plan.scripts.len());

    let outcome = run_plan(db.as_ref(), &plan, db_type, Some(&reporter)).await;
    db.close().await;

    match outcome {
        Ok(report) => {
            common::print_summary(&report.summary());
            if !print_verification(&report) {
                println!("Verification failed.");
                return Err(ExitCode(1).into());
            }
            common::finish(&report.summary(), args.strict_exit)
        }
        Err(err) => {
            if let ApplyError::PlanAborted { report, .. } = &err {
                common::print_summary(&report.summary());
            }
            Err(err.into())
        }
    }
}

/// Print the verification block; false when a table is missing
fn print_verification(report: &PlanReport) -> bool {
    let Some(verify) = &report.verify else {
        return true;
    };
    println!("\nVerification:");
    for table in &verify.present {
        println!("  ✓ {table}");
    }
    for table in &verify.missing {
        println!("  ✗ {table} (missing)");
    }
    verify.is_complete()
}
