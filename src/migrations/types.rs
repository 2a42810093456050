// Migration configuration types
// Layout of the migration tool's configuration file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root of `migrations.toml`
#[derive(Debug, Deserialize, Clone)]
pub struct MigrationsConfig {
    pub paths: PathsConfig,
    #[serde(default = "default_migration_table")]
    pub default_migration_table: String,
    pub default_environment: String,
    #[serde(default)]
    pub version_order: VersionOrder,
    pub environments: BTreeMap<String, DatabaseEnvironment>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_migration_table() -> String {
    "phinxlog".to_string()
}

/// Where migration and seed files live
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub migrations: String,
    #[serde(default)]
    pub seeds: Option<String>,
}

/// Order in which the tool considers migrations applied
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrder {
    /// By the timestamp in the migration's file name
    #[default]
    Creation,
    /// By the time the migration was executed
    Execution,
}

impl fmt::Display for VersionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => f.write_str("creation"),
            Self::Execution => f.write_str("execution"),
        }
    }
}

/// Database driver
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adapter {
    Mysql,
    Pgsql,
    Sqlite,
    Sqlsrv,
}

impl Adapter {
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::Mysql => Some(3306),
            Self::Pgsql => Some(5432),
            Self::Sqlsrv => Some(1433),
            Self::Sqlite => None,
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mysql => "mysql",
            Self::Pgsql => "pgsql",
            Self::Sqlite => "sqlite",
            Self::Sqlsrv => "sqlsrv",
        };
        f.write_str(s)
    }
}

/// Connection settings for one named environment
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseEnvironment {
    pub adapter: Adapter,
    /// Database name, or file path for sqlite
    pub name: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub table_prefix: Option<String>,
}
