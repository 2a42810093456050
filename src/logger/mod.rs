//! Logger module
//!
//! Provides logging utilities for the development server including:
//! - Level filtering driven by `logging.level`
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Log verbosity, ordered from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. An unknown level falls back
/// to `info` with a warning.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse::<Level>().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, using info");
        Level::Info
    });
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        level,
    )
}

fn enabled(level: Level) -> bool {
    !writer::is_initialized() || writer::get().enabled(level)
}

/// Write to info log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    if !enabled(Level::Info) {
        return;
    }
    write_info("======================================");
    write_info("Development server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Document root: {}", config.root.document_root));
    write_info(&format!(
        "Static fallback: {}/{}",
        config.root.document_root, config.root.public_dir
    ));
    write_info(&format!("Application upstream: http://{}", config.app.upstream));
    write_info(&format!("Log level: {}", config.logging.level));
    write_info(&format!("Upload limit: {} bytes", config.http.max_body_size));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_server_stop() {
    log_info("Server stopped");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

/// Log a failure reported by the upstream application server client
pub fn log_upstream_error(target: &str, err: &impl std::fmt::Display) {
    log_error(&format!("[UPSTREAM] {target}: {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("Info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("trace".parse::<Level>().unwrap(), Level::Debug);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_order() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Info < Level::Debug);
        assert_eq!(Level::Warn.to_string(), "warn");
    }
}
