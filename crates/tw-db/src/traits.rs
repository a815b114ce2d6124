//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use tw_core::Guard;

/// Database abstraction trait for Tidewater
///
/// One value wraps exactly one connection; statements run strictly one at a
/// time. Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists
    async fn table_exists(&self, table: &str) -> DbResult<bool>;

    /// Check if a column exists on a table
    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool>;

    /// Check if a named index exists on a table
    async fn index_exists(&self, table: &str, index: &str) -> DbResult<bool>;

    /// Check if a named constraint exists on a table
    async fn constraint_exists(&self, table: &str, constraint: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Release the connection. Further calls fail.
    async fn close(&self);

    /// Evaluate an existence guard
    async fn guard_holds(&self, guard: &Guard) -> DbResult<bool> {
        match guard {
            Guard::TableExists { table } => self.table_exists(table).await,
            Guard::ColumnExists { table, column } => self.column_exists(table, column).await,
            Guard::IndexExists { table, index } => self.index_exists(table, index).await,
            Guard::ConstraintExists { table, constraint } => {
                self.constraint_exists(table, constraint).await
            }
        }
    }
}
