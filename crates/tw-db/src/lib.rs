//! tw-db - Database abstraction layer for Tidewater
//!
//! This crate provides the `Database` trait, DuckDB and MySQL
//! implementations, and the classification of driver errors into
//! "object already exists" versus genuine failures.

pub mod classify;
pub mod connect;
pub mod duckdb;
pub mod error;
pub mod mysql;
pub mod traits;

pub use classify::{classify, AlreadyExistsKind, ErrorClass};
pub use connect::connect;
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use mysql::MySqlBackend;
pub use traits::Database;
