//! Error types for tw-sql

use thiserror::Error;

/// SQL splitting errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Tokenizer error (S001)
    #[error("[S001] SQL tokenize error at line {line}, column {column}: {message}")]
    Tokenize {
        message: String,
        line: u64,
        column: u64,
    },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
