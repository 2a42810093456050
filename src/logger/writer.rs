//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use super::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
    level: Level,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        level: Level,
    ) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
            level,
        })
    }

    /// Whether messages at `level` pass the configured verbosity
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        self.access.write(message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        self.error.write(message);
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        self.access.write(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    level: Level,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, level)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer
///
/// Panics if `init()` has not been called.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::writer::init() first.")
}

/// Check if the log writer has been initialized
pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(Some(path_str), None, Level::Info).unwrap();
        writer.write_access("first");
        writer.write_access("second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_level_filter() {
        let writer = LogWriter::new(None, None, Level::Warn).unwrap();
        assert!(writer.enabled(Level::Error));
        assert!(writer.enabled(Level::Warn));
        assert!(!writer.enabled(Level::Info));
        assert!(!writer.enabled(Level::Debug));
    }
}
