//! Statement execution

use crate::error::ApplyError;
use crate::result::{ApplyReport, ApplyResult, StatementError, StatementOutcome};
use std::time::Instant;
use tw_core::{FailurePolicy, Guard};
use tw_db::{Database, DbError, ErrorClass};
use tw_sql::{preview, Statement, StatementBatch};

/// Preview length used in results and log lines
pub const DEFAULT_PREVIEW_CHARS: usize = 50;

/// A statement plus an optional existence guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Statement text
    pub sql: String,
    /// Skip the statement when this object already exists
    pub guard: Option<Guard>,
}

impl Step {
    /// Unguarded step
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            guard: None,
        }
    }

    /// Step skipped when `guard` holds
    pub fn guarded(sql: impl Into<String>, guard: Guard) -> Self {
        Self {
            sql: sql.into(),
            guard: Some(guard),
        }
    }
}

impl From<&Statement> for Step {
    fn from(stmt: &Statement) -> Self {
        Step::new(stmt.sql.clone())
    }
}

/// Receives progress as statements finish
pub trait Reporter: Send + Sync {
    /// Called before the first statement of a named script
    fn script_started(&self, _name: &str, _policy: FailurePolicy, _statements: usize) {}

    /// Called once per statement, in order
    fn statement_finished(&self, result: &ApplyResult);
}

/// Applies statements one at a time, in order, over one connection
pub struct Applier<'a> {
    db: &'a dyn Database,
    policy: FailurePolicy,
    reporter: Option<&'a dyn Reporter>,
    preview_chars: usize,
}

impl<'a> Applier<'a> {
    /// Create an applier with an explicit failure policy
    pub fn new(db: &'a dyn Database, policy: FailurePolicy) -> Self {
        Self {
            db,
            policy,
            reporter: None,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Report each finished statement to `reporter`
    pub fn with_reporter(mut self, reporter: &'a dyn Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Override the preview length
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// The policy this applier was built with
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Apply every statement of `batch`
    pub async fn apply_batch(&self, batch: &StatementBatch) -> Result<ApplyReport, ApplyError> {
        let steps: Vec<Step> = batch.iter().map(Step::from).collect();
        self.apply_steps(&steps).await
    }

    /// Apply `steps` in order.
    ///
    /// Under [`FailurePolicy::AbortOnError`] the first unclassified failure
    /// ends the run with [`ApplyError::Aborted`]; later steps never execute.
    pub async fn apply_steps(&self, steps: &[Step]) -> Result<ApplyReport, ApplyError> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(steps.len());

        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            let (result, failure) = self.apply_step(index, step).await;
            if let Some(reporter) = self.reporter {
                reporter.statement_finished(&result);
            }
            let preview = result.preview.clone();
            results.push(result);

            if let Some(source) = failure {
                if self.policy == FailurePolicy::AbortOnError {
                    let report = ApplyReport::new(results, start.elapsed(), true);
                    return Err(ApplyError::Aborted {
                        index,
                        preview,
                        source,
                        report: Box::new(report),
                    });
                }
            }
        }

        let report = ApplyReport::new(results, start.elapsed(), false);
        log::info!("Run completed: {}", report.summary);
        Ok(report)
    }

    /// Run one step. The error is returned only for unclassified failures.
    async fn apply_step(&self, index: usize, step: &Step) -> (ApplyResult, Option<DbError>) {
        let start = Instant::now();
        let preview = preview(&step.sql, self.preview_chars);

        if let Some(guard) = &step.guard {
            match self.db.guard_holds(guard).await {
                Ok(true) => {
                    log::info!("Skipped [{index}] {preview}: {guard} already exists");
                    let result = ApplyResult {
                        index,
                        preview,
                        outcome: StatementOutcome::SkippedGuard(guard.clone()),
                        error: None,
                        duration: start.elapsed(),
                    };
                    return (result, None);
                }
                Ok(false) => {}
                Err(err) => {
                    log::error!("Guard check failed [{index}] {preview}: {err}");
                    return (Self::failed(index, preview, &err, start), Some(err));
                }
            }
        }

        match self.db.execute(&step.sql).await {
            Ok(()) => {
                log::info!("Applied [{index}] {preview}");
                let result = ApplyResult {
                    index,
                    preview,
                    outcome: StatementOutcome::Applied,
                    error: None,
                    duration: start.elapsed(),
                };
                (result, None)
            }
            Err(err) => match err.class() {
                ErrorClass::AlreadyExists(kind) => {
                    log::warn!("Skipped [{index}] {preview}: {kind} ({})", err.message());
                    let result = ApplyResult {
                        index,
                        preview,
                        outcome: StatementOutcome::SkippedAlreadyExists(kind),
                        error: Some(StatementError::from(&err)),
                        duration: start.elapsed(),
                    };
                    (result, None)
                }
                ErrorClass::Other => {
                    log::error!("Failed [{index}] {preview}: {err}");
                    (Self::failed(index, preview, &err, start), Some(err))
                }
            },
        }
    }

    fn failed(index: usize, preview: String, err: &DbError, start: Instant) -> ApplyResult {
        ApplyResult {
            index,
            preview,
            outcome: StatementOutcome::Failed,
            error: Some(StatementError::from(err)),
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
