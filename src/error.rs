//! Crate error type
//!
//! Startup and configuration failures. Per-request failures never surface
//! here: the handler maps them to HTTP status codes directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid upstream authority '{0}'")]
    InvalidUpstream(String),

    #[error("document root '{path}' is not accessible: {source}")]
    DocumentRoot {
        path: String,
        source: std::io::Error,
    },

    #[error("unknown migration environment '{0}'")]
    UnknownEnvironment(String),

    #[error("invalid migration configuration: {0}")]
    InvalidMigrations(String),

    #[error("failed to render migration environment: {0}")]
    Render(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
