//! Download error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error`. For I/O errors, we capture the kind
//! and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::FetchError;

/// Error type for resolution and download operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "not found", "permission denied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Network/HTTP error.
    #[error("Network error: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if available.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// A page was fetched but its markup could not be understood.
    #[error("Parse error: {message}")]
    Parse {
        /// Detailed error message.
        message: String,
    },

    /// The site served an anti-automation challenge instead of the page.
    #[error("Anti-automation challenge at {url} after {attempts} attempt(s)")]
    ChallengeDetected {
        /// The page that was challenged.
        url: String,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The interstitial page offers more than one destination.
    #[error("Ambiguous redirect at {url}, alternate destination {alternate}")]
    RedirectAmbiguity {
        /// The interstitial page URL.
        url: String,
        /// A destination other than the first candidate.
        alternate: String,
    },

    /// The "artifact" is a bot-check placeholder, not a real binary.
    #[error("Placeholder artifact '{filename}' served for {url}")]
    PlaceholderArtifact {
        /// The final URL that was fetched.
        url: String,
        /// The placeholder file name.
        filename: String,
    },

    /// The request itself is malformed (caller or configuration mistake).
    #[error("Structural error: {message}")]
    Structural {
        /// Detailed error message.
        message: String,
    },

    /// The run was cancelled.
    #[error("Download cancelled")]
    Cancelled,

    /// General/uncategorized error.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl DownloadError {
    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a challenge error.
    pub fn challenge(url: impl Into<String>, attempts: u32) -> Self {
        Self::ChallengeDetected {
            url: url.into(),
            attempts,
        }
    }

    /// Create a redirect ambiguity error.
    pub fn redirect_ambiguity(url: impl Into<String>, alternate: impl Into<String>) -> Self {
        Self::RedirectAmbiguity {
            url: url.into(),
            alternate: alternate.into(),
        }
    }

    /// Create a placeholder artifact error.
    pub fn placeholder(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::PlaceholderArtifact {
            url: url.into(),
            filename: filename.into(),
        }
    }

    /// Create a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is retried in place (same request, after a delay).
    #[must_use]
    pub const fn is_retryable_in_place(&self) -> bool {
        matches!(self, Self::ChallengeDetected { .. } | Self::Network { .. })
    }

    /// Check if this error is deferred to the failure store.
    #[must_use]
    pub const fn is_deferrable(&self) -> bool {
        matches!(
            self,
            Self::RedirectAmbiguity { .. } | Self::PlaceholderArtifact { .. }
        )
    }

    /// Check if this error aborts the whole invocation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Structural { .. } | Self::Cancelled)
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { message, .. } => format!("File operation failed: {message}"),
            Self::Network {
                message,
                status_code: Some(code),
            } => {
                format!("Network error (HTTP {code}): {message}")
            }
            Self::Network { message, .. } => format!("Network error: {message}"),
            Self::Parse { message } => format!("Could not understand page: {message}"),
            Self::ChallengeDetected { url, attempts } => format!(
                "The site kept serving a browser check for {url} ({attempts} attempts). Try again later."
            ),
            Self::RedirectAmbiguity { url, alternate } => format!(
                "Could not pick a download link on {url}; another candidate was {alternate}."
            ),
            Self::PlaceholderArtifact { url, .. } => {
                format!("The site returned a placeholder instead of the file for {url}.")
            }
            Self::Structural { message } => format!("Invalid request: {message}"),
            Self::Cancelled => "Download was cancelled.".to_string(),
            Self::Other { message } => message.clone(),
        }
    }
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { url, status } => {
                Self::network_with_status(format!("request to {url} failed"), status)
            }
            FetchError::Network { url, message } => {
                Self::network(format!("request to {url} failed: {message}"))
            }
            FetchError::InvalidUrl { url, message } => {
                Self::structural(format!("invalid URL '{url}': {message}"))
            }
            FetchError::Io { message } => Self::io("Other", message),
        }
    }
}

/// Convenience result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;
