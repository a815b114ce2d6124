//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::{Connection, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::wrap(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::wrap(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<()> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(DbError::closed)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run a `SELECT COUNT(*)` introspection query synchronously
    fn exists_sync(&self, sql: &str, params: &[&dyn ToSql]) -> DbResult<bool> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(DbError::closed)?;
        let count: i64 = conn
            .query_row(sql, params, |row| row.get(0))
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.execute_sync(sql)
    }

    async fn table_exists(&self, table: &str) -> DbResult<bool> {
        self.exists_sync(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = ?",
            &[&table],
        )
    }

    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        self.exists_sync(
            "SELECT COUNT(*) FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = ? AND column_name = ?",
            &[&table, &column],
        )
    }

    async fn index_exists(&self, table: &str, index: &str) -> DbResult<bool> {
        self.exists_sync(
            "SELECT COUNT(*) FROM duckdb_indexes() \
             WHERE schema_name = current_schema() AND table_name = ? AND index_name = ?",
            &[&table, &index],
        )
    }

    async fn constraint_exists(&self, table: &str, constraint: &str) -> DbResult<bool> {
        self.exists_sync(
            "SELECT COUNT(*) FROM information_schema.table_constraints \
             WHERE table_schema = current_schema() AND table_name = ? AND constraint_name = ?",
            &[&table, &constraint],
        )
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    async fn close(&self) {
        match self.lock() {
            Ok(mut guard) => {
                if let Some(conn) = guard.take() {
                    if let Err((_, e)) = conn.close() {
                        log::warn!("Failed to close DuckDB connection: {e}");
                    }
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
