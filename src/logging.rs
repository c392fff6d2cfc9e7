//! Tracing setup
//!
//! The TUI owns the terminal, so interactive runs log to a file in the
//! platform data directory. Report runs log to stderr. The filter is read
//! from `GEOHAZARD_LOG` and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "GEOHAZARD_LOG";

const LOG_FILE: &str = "geohazard.log";

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to `geohazard.log` in the data directory
    File,
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Path of the log file, if a data directory exists
pub fn log_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "geohazard").map(|dirs| dirs.data_local_dir().join(LOG_FILE))
}

fn open_log_file() -> Option<File> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Installs the global subscriber
///
/// If the log file cannot be opened, logging stays disabled. Calling this
/// twice is harmless.
pub fn init(target: LogTarget) {
    match target {
        LogTarget::File => {
            let Some(file) = open_log_file() else {
                return;
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
