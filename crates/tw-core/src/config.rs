//! Connection configuration
//!
//! Settings arrive as optional values (from flags or `DB_*` environment
//! variables) and are resolved into a [`ConnectionConfig`] once, at startup.
//! The documented fallbacks (`localhost`, `root`, empty password, `cms_db`)
//! only apply outside the production profile.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_USER: &str = "root";
const DEFAULT_DATABASE: &str = "cms_db";
const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_DUCKDB_PATH: &str = ":memory:";

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// MySQL / MariaDB (default)
    #[default]
    MySql,
    /// Embedded DuckDB
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::MySql => write!(f, "mysql"),
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Deployment profile, controls whether insecure defaults are allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local development (defaults allowed)
    #[default]
    Development,
    /// Test runs (defaults allowed)
    Test,
    /// Production (every connection setting must be explicit)
    Production,
}

impl Profile {
    /// Whether the documented connection defaults may be used
    pub fn allows_defaults(self) -> bool {
        !matches!(self, Profile::Production)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Test => write!(f, "test"),
            Profile::Production => write!(f, "production"),
        }
    }
}

/// Unresolved connection settings as supplied by the operator
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    /// `DB_HOST`
    pub host: Option<String>,
    /// `DB_PORT`
    pub port: Option<u16>,
    /// `DB_USER`
    pub user: Option<String>,
    /// `DB_PASSWORD`
    pub password: Option<String>,
    /// `DB_NAME`
    pub database: Option<String>,
    /// `DB_PATH` (DuckDB only)
    pub path: Option<String>,
}

/// Fully resolved connection configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Backend to connect to
    pub db_type: DbType,
    /// Server host (MySQL)
    pub host: String,
    /// Server port (MySQL)
    pub port: u16,
    /// Login user (MySQL)
    pub user: String,
    /// Login password (MySQL)
    pub password: String,
    /// Database (schema) name (MySQL)
    pub database: String,
    /// Database file or `:memory:` (DuckDB)
    pub path: String,
}

impl ConnectionSettings {
    /// Resolve into a [`ConnectionConfig`] for `db_type` under `profile`.
    ///
    /// Blank strings count as missing, except for the password where an
    /// empty value is only rejected in production.
    pub fn resolve(self, db_type: DbType, profile: Profile) -> CoreResult<ConnectionConfig> {
        let defaults = profile.allows_defaults();
        let require = |value: Option<String>,
                       default: &str,
                       setting: &'static str,
                       env_var: &'static str|
         -> CoreResult<String> {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => Ok(v),
                None if defaults => Ok(default.to_string()),
                None => Err(CoreError::MissingSetting {
                    setting,
                    env_var,
                    profile: profile.to_string(),
                }),
            }
        };

        let config = match db_type {
            DbType::MySql => {
                let host = require(self.host, DEFAULT_HOST, "host", "DB_HOST")?;
                let user = require(self.user, DEFAULT_USER, "user", "DB_USER")?;
                let database = require(self.database, DEFAULT_DATABASE, "database", "DB_NAME")?;
                let password = self.password.unwrap_or_default();
                if !defaults && password.is_empty() {
                    return Err(CoreError::MissingSetting {
                        setting: "password",
                        env_var: "DB_PASSWORD",
                        profile: profile.to_string(),
                    });
                }
                ConnectionConfig {
                    db_type,
                    host,
                    port: self.port.unwrap_or(DEFAULT_MYSQL_PORT),
                    user,
                    password,
                    database,
                    path: String::new(),
                }
            }
            DbType::DuckDb => {
                let path = require(self.path, DEFAULT_DUCKDB_PATH, "path", "DB_PATH")?;
                ConnectionConfig {
                    db_type,
                    host: String::new(),
                    port: 0,
                    user: String::new(),
                    password: String::new(),
                    database: String::new(),
                    path,
                }
            }
        };

        if config.port == 0 && db_type == DbType::MySql {
            return Err(CoreError::ConfigInvalid {
                message: "DB_PORT must be between 1 and 65535".to_string(),
            });
        }
        if profile == Profile::Production && config.path == DEFAULT_DUCKDB_PATH {
            log::warn!("Production profile is applying schema to an in-memory DuckDB database");
        }
        Ok(config)
    }
}

impl ConnectionConfig {
    /// Human-readable connection target, never includes the password
    pub fn target(&self) -> String {
        match self.db_type {
            DbType::MySql => format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
            DbType::DuckDb => format!("duckdb:{}", self.path),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
