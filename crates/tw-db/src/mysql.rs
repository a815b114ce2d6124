//! MySQL database backend implementation
//!
//! One connection is opened and held for the whole run, so session state a
//! script sets (`SET FOREIGN_KEY_CHECKS`, user variables, `USE`) applies to
//! every later statement. Existence checks read `INFORMATION_SCHEMA` for the
//! connection's current database.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tw_core::ConnectionConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// MySQL database backend
pub struct MySqlBackend {
    conn: Mutex<Option<MySqlConnection>>,
}

impl MySqlBackend {
    /// Open the single connection described by `config`
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, MySqlConnection::connect_with(&options))
            .await
            .map_err(|_| {
                DbError::ConnectionError(format!(
                    "{}: timed out after {}s",
                    config.target(),
                    CONNECT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| DbError::ConnectionError(format!("{}: {e}", config.target())))?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    async fn lock(&self) -> MutexGuard<'_, Option<MySqlConnection>> {
        self.conn.lock().await
    }

    /// Run a `SELECT COUNT(*)` introspection query with string binds
    async fn exists(&self, sql: &str, binds: &[&str]) -> DbResult<bool> {
        let mut guard = self.lock().await;
        let conn = guard.as_mut().ok_or_else(DbError::closed)?;
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in binds {
            query = query.bind(*value);
        }
        let count = query
            .fetch_one(conn)
            .await
            .map_err(|e| DbError::IntrospectionError(e.to_string()))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Database for MySqlBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        let mut guard = self.lock().await;
        let conn = guard.as_mut().ok_or_else(DbError::closed)?;
        // Text protocol: not every DDL statement can be prepared.
        sqlx::Executor::execute(&mut *conn, sql).await?;
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> DbResult<bool> {
        self.exists(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
            &[table],
        )
        .await
    }

    async fn column_exists(&self, table: &str, column: &str) -> DbResult<bool> {
        self.exists(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
            &[table, column],
        )
        .await
    }

    async fn index_exists(&self, table: &str, index: &str) -> DbResult<bool> {
        self.exists(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.STATISTICS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?",
            &[table, index],
        )
        .await
    }

    async fn constraint_exists(&self, table: &str, constraint: &str) -> DbResult<bool> {
        self.exists(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = ?",
            &[table, constraint],
        )
        .await
    }

    fn db_type(&self) -> &'static str {
        "mysql"
    }

    async fn close(&self) {
        let conn = self.lock().await.take();
        if let Some(conn) = conn {
            if let Err(e) = conn.close().await {
                log::warn!("Closing the MySQL connection failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::{ConnectionSettings, DbType, Profile};

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        let config = ConnectionSettings {
            host: Some("127.0.0.1".to_string()),
            port: Some(1),
            ..Default::default()
        }
        .resolve(DbType::MySql, Profile::Test)
        .unwrap();

        let err = MySqlBackend::connect(&config).await.err().unwrap();
        assert!(matches!(err, DbError::ConnectionError(_)));
        assert!(err.to_string().contains("mysql://root@127.0.0.1:1/cms_db"));
    }

    #[tokio::test]
    async fn test_closed_backend_refuses_work() {
        let backend = MySqlBackend {
            conn: Mutex::new(None),
        };

        let err = backend.execute("SET FOREIGN_KEY_CHECKS = 0").await.unwrap_err();
        assert_eq!(err.message(), "connection already closed");
        let err = backend.table_exists("users").await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionError(_)));

        backend.close().await;
        backend.close().await;
    }
}
