// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure, immutable once loaded
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub root: RootConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Filesystem layout the router resolves static assets against
#[derive(Debug, Deserialize, Clone)]
pub struct RootConfig {
    /// Server root, checked first
    pub document_root: String,
    /// Fallback directory, relative to `document_root`
    pub public_dir: String,
}

/// Application entry point (the upstream application server)
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// `host:port` of the application server
    pub upstream: String,
    /// Upper bound for one upstream exchange, in seconds
    pub timeout_secs: u64,
    /// Forward the client's `Host` header instead of the upstream authority
    pub preserve_host: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds a client may take to send request headers, idle keep-alive included
    pub read_timeout: u64,
    /// Seconds in-flight connections get to finish after shutdown is requested
    pub shutdown_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Upload limit: largest request body accepted for forwarding
    pub max_body_size: u64,
}
