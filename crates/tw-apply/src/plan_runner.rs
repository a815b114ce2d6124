//! Multi-script plans
//!
//! Every script is read and split before the first statement runs, so a
//! missing file or an unterminated literal stops the plan with nothing
//! applied. Scripts then run in plan order over the same connection, each
//! under its own failure policy.

use crate::applier::{Applier, Reporter, Step};
use crate::error::ApplyError;
use crate::result::{ApplyReport, RunSummary};
use crate::verify::{verify_tables, VerifyReport};
use tw_core::{read_sql_file, DbType, FailurePolicy, Plan, ScriptConfig, ScriptSource};
use tw_db::Database;
use tw_sql::split_statements;

/// A script ready to run
#[derive(Debug, Clone)]
pub struct PreparedScript {
    /// Script name from the plan
    pub name: String,
    /// Failure policy from the plan
    pub policy: FailurePolicy,
    /// Statements in execution order
    pub steps: Vec<Step>,
}

/// Outcome of one script
#[derive(Debug, Clone)]
pub struct ScriptReport {
    pub name: String,
    pub policy: FailurePolicy,
    pub report: ApplyReport,
}

/// Outcome of a whole plan
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    /// Scripts that ran, in order. An aborted script is the last entry.
    pub scripts: Vec<ScriptReport>,

    /// Verification result, when the plan asked for one and every script ran
    pub verify: Option<VerifyReport>,
}

impl PlanReport {
    /// Counts across all scripts
    pub fn summary(&self) -> RunSummary {
        let mut total = RunSummary::default();
        for script in &self.scripts {
            total.merge(&script.report.summary);
        }
        total
    }

    /// No failed statement, no abort, and no missing table
    pub fn is_clean(&self) -> bool {
        self.summary().is_clean()
            && self
                .verify
                .as_ref()
                .map_or(true, VerifyReport::is_complete)
    }
}

/// Read and split every script of `plan`
pub fn prepare_plan(plan: &Plan, db_type: DbType) -> Result<Vec<PreparedScript>, ApplyError> {
    plan.scripts
        .iter()
        .map(|script| prepare_script(plan, script, db_type))
        .collect()
}

fn prepare_script(
    plan: &Plan,
    script: &ScriptConfig,
    db_type: DbType,
) -> Result<PreparedScript, ApplyError> {
    let steps: Vec<Step> = match script.source() {
        ScriptSource::Inline(sql) => split_statements(sql, db_type, script.comments)?
            .iter()
            .map(Step::from)
            .collect(),
        ScriptSource::File(file) => {
            let sql = read_sql_file(&plan.resolve_file(file))?;
            split_statements(&sql, db_type, script.comments)?
                .iter()
                .map(Step::from)
                .collect()
        }
        ScriptSource::Steps(steps) => steps
            .iter()
            .map(|step| Step {
                sql: step.sql.trim().trim_end_matches(';').trim_end().to_string(),
                guard: step.unless.clone(),
            })
            .collect(),
    };
    log::debug!("Prepared script '{}': {} statements", script.name, steps.len());
    Ok(PreparedScript {
        name: script.name.clone(),
        policy: script.policy,
        steps,
    })
}

/// Run `plan` against `db`.
///
/// A script that aborts stops the plan with [`ApplyError::PlanAborted`],
/// which carries the reports gathered so far. Verification only runs once
/// every script has finished.
pub async fn run_plan(
    db: &dyn Database,
    plan: &Plan,
    db_type: DbType,
    reporter: Option<&dyn Reporter>,
) -> Result<PlanReport, ApplyError> {
    let scripts = prepare_plan(plan, db_type)?;
    let mut plan_report = PlanReport::default();

    for script in scripts {
        log::info!(
            "Running script '{}' ({} statements, {})",
            script.name,
            script.steps.len(),
            script.policy
        );
        if let Some(reporter) = reporter {
            reporter.script_started(&script.name, script.policy, script.steps.len());
        }

        let mut applier = Applier::new(db, script.policy);
        if let Some(reporter) = reporter {
            applier = applier.with_reporter(reporter);
        }

        match applier.apply_steps(&script.steps).await {
            Ok(report) => plan_report.scripts.push(ScriptReport {
                name: script.name,
                policy: script.policy,
                report,
            }),
            Err(ApplyError::Aborted {
                index,
                preview,
                source,
                report,
            }) => {
                plan_report.scripts.push(ScriptReport {
                    name: script.name.clone(),
                    policy: script.policy,
                    report: *report,
                });
                return Err(ApplyError::PlanAborted {
                    script: script.name,
                    index,
                    preview,
                    source,
                    report: Box::new(plan_report),
                });
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(verify) = &plan.verify {
        plan_report.verify = Some(verify_tables(db, &verify.tables).await?);
    }

    log::info!("Plan completed: {}", plan_report.summary());
    Ok(plan_report)
}

#[cfg(test)]
#[path = "plan_runner_test.rs"]
mod tests;
