//! Diagnostic logging to a file. The terminal belongs to the UI, so nothing
//! is ever written to stdout or stderr once the session starts.

use std::error::Error as StdError;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::core::config::project_dirs;

pub const LOG_ENV_VAR: &str = "PARLEY_LOG";
const LOG_FILE_NAME: &str = "parley.log";
const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug)]
pub enum LoggingError {
    CreateLogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    OpenLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    InitSubscriber(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::CreateLogDir { path, source } => {
                write!(f, "Failed to create log directory {}: {}", path.display(), source)
            }
            LoggingError::OpenLogFile { path, source } => {
                write!(f, "Failed to open log file {}: {}", path.display(), source)
            }
            LoggingError::InitSubscriber(source) => {
                write!(f, "Failed to initialize logging: {source}")
            }
        }
    }
}

impl StdError for LoggingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            LoggingError::CreateLogDir { source, .. } | LoggingError::OpenLogFile { source, .. } => {
                Some(source)
            }
            LoggingError::InitSubscriber(source) => Some(source.as_ref()),
        }
    }
}

/// Where logs go when `--log-file` is not given.
pub fn default_log_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILE_NAME)
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber, appending to `path` (or the default log
/// file). Returns the path actually used.
pub fn init_logging(path: Option<&Path>) -> Result<PathBuf, LoggingError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| LoggingError::CreateLogDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(LoggingError::InitSubscriber)?;

    Ok(path)
}
