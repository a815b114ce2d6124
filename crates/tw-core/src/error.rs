//! Error types for tw-core

use thiserror::Error;

/// Core error type for Tidewater
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Plan file not found
    #[error("[C001] Plan file not found: {path}")]
    PlanNotFound { path: String },

    /// C002: Failed to parse a plan file
    #[error("[C002] Failed to parse plan {path}: {message}")]
    PlanParseError { path: String, message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Required connection setting missing for the active profile
    #[error("[C004] Missing {setting} ({env_var}) for profile '{profile}'")]
    MissingSetting {
        setting: &'static str,
        env_var: &'static str,
        profile: String,
    },

    /// C005: SQL source file could not be read
    #[error("[C005] Failed to read SQL file {path}: {source}")]
    SqlFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// C006: IO error
    #[error("[C006] IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
