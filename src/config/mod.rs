// Configuration module entry point
// Loads the immutable server configuration and builds the shared state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::{Error, Result};

// Re-export public types
pub use state::AppState;
pub use types::{AppConfig, Config, RootConfig};

/// Environment variable prefix, e.g. `DEVSERVER_SERVER__PORT=9000`
const ENV_PREFIX: &str = "DEVSERVER";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing file is fine: every key has a default
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("root.document_root", ".")?
            .set_default("root.public_dir", "public")?
            .set_default("app.upstream", "127.0.0.1:9000")?
            .set_default("app.timeout_secs", 30)?
            .set_default("app.preserve_host", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.shutdown_timeout", 30)?
            .set_default("http.server_name", "devserver/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| Error::InvalidAddress { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.root.document_root, ".");
        assert_eq!(cfg.root.public_dir, "public");
        assert_eq!(cfg.app.upstream, "127.0.0.1:9000");
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devserver.toml");
        std::fs::write(
            &path,
            "[server]\nport = 3000\n\n[root]\ndocument_root = \"/srv/app\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let stem = dir.path().join("devserver");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.root.document_root, "/srv/app");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.root.public_dir, "public");
    }

    #[test]
    fn test_socket_addr() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from(dir.path().join("x").to_str().unwrap()).unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not an ip".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(Error::InvalidAddress { .. })
        ));
    }
}
