//! tw-core - Core library for Tidewater
//!
//! This crate provides the connection configuration, plan file parsing, and
//! the small set of enums shared by the splitter, the database backends and
//! the applier.

pub mod config;
pub mod error;
pub mod plan;

pub use config::{ConnectionConfig, ConnectionSettings, DbType, Profile};
pub use error::{CoreError, CoreResult};
pub use plan::{
    read_sql_file, CommentMode, FailurePolicy, Guard, Plan, ScriptConfig, ScriptSource,
    StepConfig, VerifyConfig,
};
