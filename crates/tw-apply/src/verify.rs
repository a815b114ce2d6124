//! Post-run table verification

use crate::error::ApplyError;
use tw_db::Database;

/// Which of the expected tables exist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Tables found, in request order
    pub present: Vec<String>,
    /// Tables not found, in request order
    pub missing: Vec<String>,
}

impl VerifyReport {
    /// True when every expected table exists
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check that each of `tables` exists
pub async fn verify_tables(
    db: &dyn Database,
    tables: &[String],
) -> Result<VerifyReport, ApplyError> {
    let mut report = VerifyReport::default();
    for table in tables {
        if db.table_exists(table).await? {
            log::debug!("Verified table {table}");
            report.present.push(table.clone());
        } else {
            log::warn!("Expected table {table} is missing");
            report.missing.push(table.clone());
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_db::DuckDbBackend;

    #[tokio::test]
    async fn test_reports_present_and_missing() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute("CREATE TABLE users (id INTEGER)").await.unwrap();
        db.execute("CREATE VIEW active_users AS SELECT * FROM users")
            .await
            .unwrap();

        let tables = vec![
            "users".to_string(),
            "departments".to_string(),
            "active_users".to_string(),
        ];
        let report = verify_tables(&db, &tables).await.unwrap();

        assert_eq!(report.present, vec!["users", "active_users"]);
        assert_eq!(report.missing, vec!["departments"]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_empty_list_is_complete() {
        let db = DuckDbBackend::in_memory().unwrap();
        let report = verify_tables(&db, &[]).await.unwrap();
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_closed_connection_is_an_error() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.close().await;
        let result = verify_tables(&db, &["users".to_string()]).await;
        assert!(matches!(result, Err(ApplyError::Db(_))));
    }
}
