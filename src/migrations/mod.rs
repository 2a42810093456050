//! Database migration tool configuration
//!
//! Loads and resolves the configuration consumed by the external migration
//! tool. Schema and version bookkeeping stay with that tool; this module only
//! answers "which database, with which settings".

mod types;

use crate::error::{Error, Result};

pub use types::{Adapter, DatabaseEnvironment, MigrationsConfig};

/// Environment variable prefix, e.g. `MIGRATIONS_ENVIRONMENTS__DEVELOPMENT__PASS=secret`
const ENV_PREFIX: &str = "MIGRATIONS";

const MASK: &str = "********";

impl MigrationsConfig {
    /// Load from file path (without extension) layered with environment overrides
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints serde can't express
    pub fn validate(&self) -> Result<()> {
        if self.paths.migrations.trim().is_empty() {
            return Err(Error::InvalidMigrations(
                "paths.migrations must not be empty".to_string(),
            ));
        }
        if self.default_migration_table.trim().is_empty() {
            return Err(Error::InvalidMigrations(
                "default_migration_table must not be empty".to_string(),
            ));
        }
        if !self.environments.contains_key(&self.default_environment) {
            return Err(Error::InvalidMigrations(format!(
                "default_environment '{}' is not defined",
                self.default_environment
            )));
        }
        for (name, env) in &self.environments {
            if env.name.trim().is_empty() {
                return Err(Error::InvalidMigrations(format!(
                    "environment '{name}' has an empty database name"
                )));
            }
        }
        Ok(())
    }

    /// Resolve the named environment, or the default one when `name` is `None`
    pub fn environment(&self, name: Option<&str>) -> Result<&DatabaseEnvironment> {
        let name = name.unwrap_or(&self.default_environment);
        self.environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))
    }
}

impl DatabaseEnvironment {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| self.adapter.default_port())
    }

    /// PDO-style data source name, without credentials
    pub fn dsn(&self) -> String {
        if self.adapter == Adapter::Sqlite {
            return format!("sqlite:{}", self.name);
        }

        let mut dsn = format!("{}:host={}", self.adapter, self.host());
        if let Some(port) = self.port() {
            dsn.push_str(&format!(";port={port}"));
        }
        dsn.push_str(&format!(";dbname={}", self.name));
        if let Some(charset) = &self.charset {
            dsn.push_str(&format!(";charset={charset}"));
        }
        dsn
    }

    /// Copy safe to print: password replaced when present
    pub fn masked(&self) -> Self {
        let mut env = self.clone();
        if env.pass.as_deref().is_some_and(|p| !p.is_empty()) {
            env.pass = Some(MASK.to_string());
        }
        env
    }

    /// Render the masked environment as TOML
    pub fn render(&self) -> Result<String> {
        Ok(toml::to_string(&self.masked())?)
    }
}

#[cfg(test)]
mod tests {
    use super::types::VersionOrder;
    use super::*;

    const SAMPLE: &str = r#"
default_migration_table = "phinxlog"
default_environment = "development"
version_order = "creation"

[paths]
migrations = "db/migrations"
seeds = "db/seeds"

[environments.development]
adapter = "mysql"
host = "127.0.0.1"
name = "app_dev"
user = "root"
pass = "secret"
charset = "utf8mb4"

[environments.testing]
adapter = "sqlite"
name = "db/testing.sqlite3"

[environments.production]
adapter = "pgsql"
host = "db.internal"
port = 6432
name = "app"
user = "deploy"
"#;

    fn load(content: &str) -> Result<MigrationsConfig> {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("migrations.toml"), content).unwrap();
        MigrationsConfig::load_from(dir.path().join("migrations").to_str().unwrap())
    }

    #[test]
    fn test_load_sample() {
        let cfg = load(SAMPLE).unwrap();
        assert_eq!(cfg.paths.migrations, "db/migrations");
        assert_eq!(cfg.paths.seeds.as_deref(), Some("db/seeds"));
        assert_eq!(cfg.version_order, VersionOrder::Creation);
        assert_eq!(cfg.environments.len(), 3);
    }

    #[test]
    fn test_default_environment_resolution() {
        let cfg = load(SAMPLE).unwrap();
        let env = cfg.environment(None).unwrap();
        assert_eq!(env.adapter, Adapter::Mysql);
        assert_eq!(env.name, "app_dev");

        let env = cfg.environment(Some("production")).unwrap();
        assert_eq!(env.adapter, Adapter::Pgsql);
    }

    #[test]
    fn test_unknown_environment() {
        let cfg = load(SAMPLE).unwrap();
        assert!(matches!(
            cfg.environment(Some("staging")),
            Err(Error::UnknownEnvironment(name)) if name == "staging"
        ));
    }

    #[test]
    fn test_dsn() {
        let cfg = load(SAMPLE).unwrap();
        assert_eq!(
            cfg.environment(Some("development")).unwrap().dsn(),
            "mysql:host=127.0.0.1;port=3306;dbname=app_dev;charset=utf8mb4"
        );
        assert_eq!(
            cfg.environment(Some("production")).unwrap().dsn(),
            "pgsql:host=db.internal;port=6432;dbname=app"
        );
        assert_eq!(
            cfg.environment(Some("testing")).unwrap().dsn(),
            "sqlite:db/testing.sqlite3"
        );
    }

    #[test]
    fn test_missing_default_environment() {
        let content = SAMPLE.replace(
            "default_environment = \"development\"",
            "default_environment = \"staging\"",
        );
        assert!(matches!(load(&content), Err(Error::InvalidMigrations(_))));
    }

    #[test]
    fn test_unknown_adapter_rejected() {
        let content = SAMPLE.replace("adapter = \"mysql\"", "adapter = \"oracle\"");
        assert!(matches!(load(&content), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_version_order_rejected() {
        let content = SAMPLE.replace("version_order = \"creation\"", "version_order = \"random\"");
        assert!(load(&content).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            MigrationsConfig::load_from(missing.to_str().unwrap()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_render_masks_password() {
        let cfg = load(SAMPLE).unwrap();
        let rendered = cfg.environment(None).unwrap().render().unwrap();
        assert!(rendered.contains("adapter = \"mysql\""));
        assert!(rendered.contains("pass = \"********\""));
        assert!(!rendered.contains("secret"));

        let rendered = cfg.environment(Some("testing")).unwrap().render().unwrap();
        assert!(!rendered.contains("pass"));
    }
}
