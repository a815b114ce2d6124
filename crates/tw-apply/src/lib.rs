//! tw-apply - Schema applier for Tidewater
//!
//! Applies statements one at a time, in source order, over a single
//! connection. Failures that only mean "this object already exists" are
//! recorded as skips; every other failure is handled by the caller's
//! [`FailurePolicy`](tw_core::FailurePolicy).

pub mod applier;
pub mod error;
pub mod plan_runner;
pub mod result;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use applier::{Applier, Reporter, Step, DEFAULT_PREVIEW_CHARS};
pub use error::ApplyError;
pub use plan_runner::{prepare_plan, run_plan, PlanReport, PreparedScript, ScriptReport};
pub use result::{ApplyReport, ApplyResult, RunSummary, StatementError, StatementOutcome};
pub use verify::{verify_tables, VerifyReport};
