//! CLI-specific error types and mappings.
//!
//! Maps pipeline and path errors to exit codes and user-facing messages.

use apkmd_core::{DownloadError, PathError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The download pipeline gave up.
    #[error("{0}")]
    Download(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interrupted by the user.
    #[error("Interrupted")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Terminated by Ctrl+C
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Download(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Structural { .. } => Self::Arguments(err.user_message()),
            DownloadError::Cancelled => Self::Cancelled,
            DownloadError::Io { .. } => Self::Io(err.user_message()),
            other => Self::Download(other.user_message()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
