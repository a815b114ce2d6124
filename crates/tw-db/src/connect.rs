//! Backend selection

use crate::duckdb::DuckDbBackend;
use crate::error::DbResult;
use crate::mysql::MySqlBackend;
use crate::traits::Database;
use tw_core::{ConnectionConfig, DbType};

/// Open the backend named by `config`
pub async fn connect(config: &ConnectionConfig) -> DbResult<Box<dyn Database>> {
    log::info!("Connecting to {}", config.target());
    let db: Box<dyn Database> = match config.db_type {
        DbType::MySql => Box::new(MySqlBackend::connect(config).await?),
        DbType::DuckDb => Box::new(DuckDbBackend::new(&config.path)?),
    };
    Ok(db)
}
