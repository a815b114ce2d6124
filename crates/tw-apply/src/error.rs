//! Error types for tw-apply

use crate::plan_runner::PlanReport;
use crate::result::ApplyReport;
use thiserror::Error;
use tw_core::CoreError;
use tw_db::DbError;
use tw_sql::SqlError;

/// Errors that end an apply run
#[derive(Error, Debug)]
pub enum ApplyError {
    /// An unclassified failure under the abort policy (A001)
    #[error("[A001] Statement {index} failed, run aborted: {preview}")]
    Aborted {
        index: usize,
        preview: String,
        #[source]
        source: DbError,
        /// Results up to and including the failing statement
        report: Box<ApplyReport>,
    },

    /// A script aborted, stopping the rest of the plan (A002)
    #[error("[A002] Script '{script}' aborted at statement {index}: {preview}")]
    PlanAborted {
        script: String,
        index: usize,
        preview: String,
        #[source]
        source: DbError,
        /// Completed scripts plus the partial one
        report: Box<PlanReport>,
    },

    /// SQL source could not be split (A003)
    #[error("[A003] {0}")]
    Sql(#[from] SqlError),

    /// Plan or SQL file problem (A004)
    #[error("[A004] {0}")]
    Core(#[from] CoreError),

    /// Database error outside statement execution (A005)
    #[error("[A005] {0}")]
    Db(#[from] DbError),
}
