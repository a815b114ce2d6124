//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tw_core::{ConnectionSettings, DbType, FailurePolicy, Profile};

/// Tidewater - apply SQL schema scripts idempotently
#[derive(Parser, Debug)]
#[command(name = "tw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Deployment profile; connection defaults are refused in production
    #[arg(long, global = true, env = "TW_PROFILE", value_enum, default_value = "development")]
    pub profile: ProfileArg,

    /// Database backend
    #[arg(short, long, global = true, env = "DB_BACKEND", value_enum, default_value = "mysql")]
    pub backend: BackendArg,

    /// Connection settings
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Connection flags, each backed by an environment variable
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Database host [default outside production: localhost]
    #[arg(long = "host", global = true, env = "DB_HOST")]
    pub host: Option<String>,

    /// Database port [default: 3306]
    #[arg(long = "port", global = true, env = "DB_PORT")]
    pub port: Option<u16>,

    /// Database user [default outside production: root]
    #[arg(long = "user", global = true, env = "DB_USER")]
    pub user: Option<String>,

    /// Database password [default outside production: empty]
    #[arg(long = "password", global = true, env = "DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name [default outside production: cms_db]
    #[arg(long = "database", global = true, env = "DB_NAME")]
    pub database: Option<String>,

    /// DuckDB file path [default: :memory:]
    #[arg(id = "db_path", long = "db-path", global = true, env = "DB_PATH")]
    pub path: Option<String>,
}

impl From<&ConnectionArgs> for ConnectionSettings {
    fn from(args: &ConnectionArgs) -> Self {
        ConnectionSettings {
            host: args.host.clone(),
            port: args.port,
            user: args.user.clone(),
            password: args.password.clone(),
            database: args.database.clone(),
            path: args.path.clone(),
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply one SQL script
    Apply(ApplyArgs),

    /// Apply every script of a YAML plan, in order
    Plan(PlanArgs),

    /// Check that tables exist
    Verify(VerifyArgs),
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// SQL file to apply
    #[arg(required_unless_present = "sql", conflicts_with = "sql")]
    pub file: Option<PathBuf>,

    /// Inline SQL text to apply instead of a file
    #[arg(long)]
    pub sql: Option<String>,

    /// What to do when a statement fails for a reason other than "already exists"
    #[arg(long, value_enum)]
    pub policy: PolicyArg,

    /// Remove comments and comment-only lines before executing
    #[arg(long)]
    pub strip_comments: bool,

    /// Print the statements without connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any statement failed, even under `continue`
    #[arg(long)]
    pub strict_exit: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan file
    pub path: PathBuf,

    /// Print each script's statements without connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any statement failed, even under `continue`
    #[arg(long)]
    pub strict_exit: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Tables that must exist
    #[arg(required = true)]
    pub tables: Vec<String>,
}

/// Deployment profile
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileArg {
    /// Local development
    Development,
    /// Automated tests
    Test,
    /// Production
    Production,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Development => Profile::Development,
            ProfileArg::Test => Profile::Test,
            ProfileArg::Production => Profile::Production,
        }
    }
}

/// Database backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// MySQL / MariaDB server
    Mysql,
    /// Embedded DuckDB
    Duckdb,
}

impl From<BackendArg> for DbType {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mysql => DbType::MySql,
            BackendArg::Duckdb => DbType::DuckDb,
        }
    }
}

/// Failure policy
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Stop at the first unclassified failure
    Abort,
    /// Run every statement and report failures at the end
    Continue,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => FailurePolicy::AbortOnError,
            PolicyArg::Continue => FailurePolicy::ContinueAndReport,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
