//! Errors raised while setting up the scraping adapters.
//!
//! Request-time failures are reported as `apkmd_core::FetchError` and
//! `apkmd_core::ParseError`; this type only covers construction.

use thiserror::Error;

/// Result type alias for adapter construction.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Errors related to building the fetcher or parser.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
