//! Plan files and the policy enums shared across crates
//!
//! A plan is a YAML document listing the scripts to apply, in order, against
//! one connection:
//!
//! ```yaml
//! scripts:
//!   - name: user_hierarchy
//!     policy: abort
//!     steps:
//!       - sql: ALTER TABLE users ADD COLUMN parent_id INT NULL
//!         unless:
//!           column_exists: { table: users, column: parent_id }
//!   - name: organizational_tables
//!     file: sql/organizational.sql
//!     comments: strip
//!     policy: continue
//! verify:
//!   tables: [conversations, messages, audit_logs]
//! ```

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// What to do when a statement fails with an unclassified error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop the run at the first unclassified failure
    #[serde(rename = "abort")]
    AbortOnError,
    /// Record the failure and keep going
    #[serde(rename = "continue")]
    ContinueAndReport,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::AbortOnError => write!(f, "abort"),
            FailurePolicy::ContinueAndReport => write!(f, "continue"),
        }
    }
}

/// Comment handling when splitting a script into statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentMode {
    /// Keep comments that sit inside a statement
    #[default]
    Keep,
    /// Remove comments and the lines they leave blank
    Strip,
}

/// Existence check run before a statement; a match skips the statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Table (or view) exists
    TableExists { table: String },
    /// Column exists on a table
    ColumnExists { table: String, column: String },
    /// Named index exists on a table
    IndexExists { table: String, index: String },
    /// Named constraint (foreign key, unique, ...) exists on a table
    ConstraintExists { table: String, constraint: String },
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::TableExists { table } => write!(f, "table {table}"),
            Guard::ColumnExists { table, column } => write!(f, "column {table}.{column}"),
            Guard::IndexExists { table, index } => write!(f, "index {index} on {table}"),
            Guard::ConstraintExists { table, constraint } => {
                write!(f, "constraint {constraint} on {table}")
            }
        }
    }
}

/// One guarded statement of a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Statement to execute
    pub sql: String,

    /// Skip the statement when this object already exists
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub unless: Option<Guard>,
}

/// A named script inside a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    /// Script name used in progress output
    pub name: String,

    /// Inline SQL text
    #[serde(default)]
    pub sql: Option<String>,

    /// SQL file, relative to the plan file
    #[serde(default)]
    pub file: Option<String>,

    /// Individually guarded statements
    #[serde(default)]
    pub steps: Vec<StepConfig>,

    /// Failure policy, always explicit
    pub policy: FailurePolicy,

    /// Comment handling for `sql` / `file` sources
    #[serde(default)]
    pub comments: CommentMode,
}

/// Borrowed view of where a script's statements come from
#[derive(Debug, Clone, Copy)]
pub enum ScriptSource<'a> {
    /// Inline SQL text
    Inline(&'a str),
    /// SQL file relative to the plan
    File(&'a str),
    /// Guarded steps
    Steps(&'a [StepConfig]),
}

impl ScriptConfig {
    /// The script's statement source. Only valid after [`Plan::validate`].
    pub fn source(&self) -> ScriptSource<'_> {
        match (&self.sql, &self.file) {
            (Some(sql), _) => ScriptSource::Inline(sql),
            (None, Some(file)) => ScriptSource::File(file),
            (None, None) => ScriptSource::Steps(&self.steps),
        }
    }
}

/// Post-run verification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    /// Tables that must exist once all scripts ran
    #[serde(default)]
    pub tables: Vec<String>,
}

/// A plan: ordered scripts plus optional verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Scripts, applied in order
    pub scripts: Vec<ScriptConfig>,

    /// Tables checked after the last script
    #[serde(default)]
    pub verify: Option<VerifyConfig>,

    /// Directory the plan was loaded from, for resolving `file` sources
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Plan {
    /// Load and validate a plan file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::PlanNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut plan = Self::from_yaml(&content).map_err(|e| match e {
            CoreError::PlanParseError { message, .. } => CoreError::PlanParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        plan.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(plan)
    }

    /// Parse and validate a plan from YAML text (base dir is `.`)
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let mut plan: Plan =
            serde_yaml::from_str(content).map_err(|e| CoreError::PlanParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        plan.base_dir = PathBuf::from(".");
        plan.validate()?;
        Ok(plan)
    }

    /// Check names are unique and every script has exactly one source
    pub fn validate(&self) -> CoreResult<()> {
        if self.scripts.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "plan has no scripts".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for script in &self.scripts {
            if script.name.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "script name must not be empty".to_string(),
                });
            }
            if !seen.insert(script.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("duplicate script name '{}'", script.name),
                });
            }
            let sources = usize::from(script.sql.is_some())
                + usize::from(script.file.is_some())
                + usize::from(!script.steps.is_empty());
            if sources != 1 {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "script '{}' must set exactly one of sql, file or steps",
                        script.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Absolute path of a script's `file` source
    pub fn resolve_file(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Read a SQL source file, mapping failures to [`CoreError::SqlFileUnreadable`]
pub fn read_sql_file(path: &Path) -> CoreResult<String> {
    std::fs::read_to_string(path).map_err(|source| CoreError::SqlFileUnreadable {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
