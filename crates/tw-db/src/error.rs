//! Error types for tw-db

use crate::classify::{classify, ErrorClass};
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed{}: {message}", fmt_code(code))]
    ExecutionError {
        /// Driver error code (MySQL error number or SQLSTATE), when known
        code: Option<String>,
        /// Driver error message
        message: String,
    },

    /// Existence check failed (D003)
    #[error("[D003] Schema introspection failed: {0}")]
    IntrospectionError(String),

    /// Mutex poisoned (D004)
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

fn fmt_code(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl DbError {
    /// Error for any use of a backend after `close`
    pub(crate) fn closed() -> Self {
        DbError::ConnectionError("connection already closed".to_string())
    }

    /// Driver error code of an execution failure
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::ExecutionError { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Driver message without the `[Dxxx]` prefix
    pub fn message(&self) -> String {
        match self {
            DbError::ExecutionError { message, .. } => message.clone(),
            DbError::ConnectionError(m)
            | DbError::IntrospectionError(m)
            | DbError::MutexPoisoned(m) => m.clone(),
        }
    }

    /// Whether this failure means the target object already exists.
    ///
    /// Only execution failures are ever classified; connection and
    /// introspection problems are always [`ErrorClass::Other`].
    pub fn class(&self) -> ErrorClass {
        match self {
            DbError::ExecutionError { code, message } => classify(code.as_deref(), message),
            _ => ErrorClass::Other,
        }
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured error code, so the message is
        // all the classifier gets.
        DbError::ExecutionError {
            code: None,
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let code = db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|e| e.number().to_string())
                    .or_else(|| db_err.code().map(|c| c.into_owned()));
                DbError::ExecutionError {
                    code,
                    message: db_err.message().to_string(),
                }
            }
            _ => DbError::ExecutionError {
                code: None,
                message: err.to_string(),
            },
        }
    }
}
