//! tw-sql - SQL layer for Tidewater
//!
//! This crate turns raw SQL text into an ordered [`StatementBatch`] using the
//! sqlparser-rs tokenizer, so statement delimiters inside string literals,
//! quoted identifiers and comments are never treated as boundaries.

pub mod dialect;
pub mod error;
pub mod preview;
pub mod splitter;

pub use dialect::dialect_for;
pub use error::{SqlError, SqlResult};
pub use preview::preview;
pub use splitter::{split_statements, Statement, StatementBatch};
