//! In-test database that answers from a script instead of a server.
//!
//! Used to reproduce MySQL error numbers that an embedded DuckDB never
//! reports.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tw_core::Guard;
use tw_db::{Database, DbError, DbResult};

#[derive(Default)]
pub(crate) struct ScriptedDb {
    failures: HashMap<String, (Option<String>, String)>,
    existing: HashSet<Guard>,
    broken_introspection: bool,
    executed: Mutex<Vec<String>>,
}

impl ScriptedDb {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `sql` fail with a MySQL error number and message
    pub(crate) fn fail_with(mut self, sql: &str, code: &str, message: &str) -> Self {
        self.failures.insert(
            sql.to_string(),
            (Some(code.to_string()), message.to_string()),
        );
        self
    }

    /// Make a guard report its object as present
    pub(crate) fn with_existing(mut self, guard: Guard) -> Self {
        self.existing.insert(guard);
        self
    }

    /// Make every existence check fail
    pub(crate) fn with_broken_introspection(mut self) -> Self {
        self.broken_introspection = true;
        self
    }

    /// Statements that reached `execute`, in order
    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn lookup(&self, guard: Guard) -> DbResult<bool> {
        if self.broken_introspection {
            return Err(DbError::IntrospectionError(
                "INFORMATION_SCHEMA unavailable".to_string(),
            ));
        }
        Ok(self.existing.contains(&guard))
    }
}

#[async_trait]
impl Database for ScriptedDb {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.executed.lock().unwrap().push(sql.to_string());
        match self.failures.get(sql) {
            Some((code, message)) => Err(DbError::ExecutionError {
                code: code.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn table_exists(&self, table: &str) -> DbResult<bool> {
        self.lookup(Guard::TableExists {
            table: table.to_string(),
        })
    }

    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        self.lookup(Guard::ColumnExists {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    async fn index_exists(&self, table: &str, index: &str) -> DbResult<bool> {
        self.lookup(Guard::IndexExists {
            table: table.to_string(),
            index: index.to_string(),
        })
    }

    async fn constraint_exists(&self, table: &str, constraint: &str) -> DbResult<bool> {
        self.lookup(Guard::ConstraintExists {
            table: table.to_string(),
            constraint: constraint.to_string(),
        })
    }

    fn db_type(&self) -> &'static str {
        "scripted"
    }

    async fn close(&self) {}
}
