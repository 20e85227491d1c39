/// Error types for logscout.
///
/// Two families live here and they are deliberately kept apart:
///
/// 1. [`ScanError`] is fatal. Anything that prevents a trustworthy count
///    (bad thresholds, a missing file, a read that fails halfway through)
///    aborts the whole scan and no status is produced.
/// 2. [`TimestampError`] is scoped to a single line. The classifier logs it
///    and drops the line; it never reaches the caller.
///
/// ```rust,ignore
/// match scan(&config) {
///     Ok(outcome) => println!("{}: {}", outcome.status, outcome.count),
///     Err(ScanError::InvalidThresholds { .. }) => // refuse to run,
///     Err(e) => // report UNKNOWN,
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that abort a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Read failed for {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Warning threshold ({warning}) must not exceed critical threshold ({critical})")]
    InvalidThresholds { warning: u64, critical: u64 },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_thresholds(warning: u64, critical: u64) -> Self {
        Self::InvalidThresholds { warning, critical }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an error from opening `path` onto the matching variant
    pub fn open_failed(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

/// Why a matching line's leading timestamp could not be used
#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("invalid log line format: expected at least 3 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("error parsing date '{candidate}': {source}")]
    Malformed {
        candidate: String,
        source: chrono::ParseError,
    },
    #[error("local time '{candidate}' does not exist in this time zone")]
    NonexistentLocalTime { candidate: String },
}
