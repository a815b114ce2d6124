//! Tokenizer dialect selection

use sqlparser::dialect::{Dialect, DuckDbDialect, MySqlDialect};
use tw_core::DbType;

/// The sqlparser dialect whose lexical rules match the target backend.
///
/// MySQL adds `#` line comments and backtick identifiers; DuckDB follows the
/// PostgreSQL-style rules.
pub fn dialect_for(db_type: DbType) -> Box<dyn Dialect> {
    match db_type {
        DbType::MySql => Box::new(MySqlDialect {}),
        DbType::DuckDb => Box::new(DuckDbDialect {}),
    }
}
