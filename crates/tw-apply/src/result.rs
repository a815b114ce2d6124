//! Per-statement results and run summaries

use std::fmt;
use std::time::Duration;
use tw_core::Guard;
use tw_db::{AlreadyExistsKind, DbError};

/// What happened to one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// Executed successfully
    Applied,
    /// Executed, but the target already existed
    SkippedAlreadyExists(AlreadyExistsKind),
    /// Not executed: the existence guard found the target
    SkippedGuard(Guard),
    /// Failed with an unclassified error
    Failed,
}

impl StatementOutcome {
    /// True for both skip variants
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            StatementOutcome::SkippedAlreadyExists(_) | StatementOutcome::SkippedGuard(_)
        )
    }
}

impl fmt::Display for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOutcome::Applied => write!(f, "applied"),
            StatementOutcome::SkippedAlreadyExists(_) => write!(f, "skipped-already-exists"),
            StatementOutcome::SkippedGuard(_) => write!(f, "skipped-guard"),
            StatementOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Driver error attached to a skipped or failed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementError {
    /// Driver error code, when known
    pub code: Option<String>,
    /// Driver message
    pub message: String,
}

impl From<&DbError> for StatementError {
    fn from(err: &DbError) -> Self {
        Self {
            code: err.code().map(str::to_string),
            message: err.message(),
        }
    }
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Result of a single statement
#[derive(Debug, Clone)]
pub struct ApplyResult {
    /// 1-based position in the batch
    pub index: usize,

    /// Leading fragment of the statement
    pub preview: String,

    /// What happened
    pub outcome: StatementOutcome,

    /// Driver error for skipped-already-exists and failed statements
    pub error: Option<StatementError>,

    /// Execution time, including any guard check
    pub duration: Duration,
}

/// Counts for a finished (or aborted) run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Statements executed or guard-checked
    pub attempted: usize,

    /// Statements applied
    pub applied: usize,

    /// Statements skipped (already exists or guard)
    pub skipped: usize,

    /// Statements that failed
    pub failed: usize,

    /// Whether the run stopped early
    pub aborted: bool,
}

impl RunSummary {
    /// Create a summary from statement results
    pub fn from_results(results: &[ApplyResult], aborted: bool) -> Self {
        Self {
            attempted: results.len(),
            applied: results
                .iter()
                .filter(|r| r.outcome == StatementOutcome::Applied)
                .count(),
            skipped: results.iter().filter(|r| r.outcome.is_skipped()).count(),
            failed: results
                .iter()
                .filter(|r| r.outcome == StatementOutcome::Failed)
                .count(),
            aborted,
        }
    }

    /// Add another summary's counts to this one
    pub fn merge(&mut self, other: &RunSummary) {
        self.attempted += other.attempted;
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.aborted |= other.aborted;
    }

    /// No failures and not aborted
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.aborted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} applied, {} skipped, {} failed",
            self.attempted, self.applied, self.skipped, self.failed
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        Ok(())
    }
}

/// Results and summary of one batch
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Per-statement results, in execution order
    pub results: Vec<ApplyResult>,

    /// Counts over `results`
    pub summary: RunSummary,

    /// Wall time of the run
    pub duration: Duration,
}

impl ApplyReport {
    /// Build a report, deriving the summary from `results`
    pub fn new(results: Vec<ApplyResult>, duration: Duration, aborted: bool) -> Self {
        let summary = RunSummary::from_results(&results, aborted);
        Self {
            results,
            summary,
            duration,
        }
    }

    /// Outcomes in execution order
    pub fn outcomes(&self) -> Vec<&StatementOutcome> {
        self.results.iter().map(|r| &r.outcome).collect()
    }
}
