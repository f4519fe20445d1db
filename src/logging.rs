//! File-based logging setup
//!
//! The terminal belongs to the UI, so log events go to a file instead of
//! stdout/stderr. By default the file lives in the platform data directory
//! (`~/.local/share/shopgrid/shopgrid.log` on Linux).

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Errors that can occur while setting up logging
#[derive(Debug, Error)]
pub enum LoggingError {
    /// No home/data directory could be determined
    #[error("could not determine a data directory for the log file")]
    NoLogPath,

    /// The log file could not be created
    #[error("could not open log file `{path}`: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The filter directive could not be parsed
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber was already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Returns the default log file location
///
/// Returns `None` if no home directory can be found (e.g. in some CI
/// containers).
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "shopgrid")?;
    Some(project_dirs.data_local_dir().join("shopgrid.log"))
}

/// Opens the log file for appending, creating parent directories
fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open = || -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds a subscriber writing plain-text events to `path`
pub fn build_subscriber(
    level: &str,
    path: &Path,
) -> Result<impl Subscriber + Send + Sync, LoggingError> {
    let filter = EnvFilter::try_new(level)?;
    let file = open_log_file(path)?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .finish())
}

/// Installs the global subscriber
///
/// Uses `log_file` when given, the platform default otherwise. Returns the
/// path actually used.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<PathBuf, LoggingError> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_log_path().ok_or(LoggingError::NoLogPath)?,
    };

    let subscriber = build_subscriber(level, &path)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(path)
}
