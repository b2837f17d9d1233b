//! Page and artifact retrieval port.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use thiserror::Error;

/// Errors reported by a `PageFetcher`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// The URL could not be parsed.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Reading the response body failed.
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// A fetched HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub requested_url: String,
    /// The URL after following redirects.
    pub final_url: String,
    /// HTTP status of the final response.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl FetchedPage {
    /// A page served directly from `url` with status 200.
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: 200,
            body: body.into(),
        }
    }

    /// A page reached from `requested` by redirect to `final_url`.
    pub fn redirected(
        requested: impl Into<String>,
        final_url: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            requested_url: requested.into(),
            final_url: final_url.into(),
            status: 200,
            body: body.into(),
        }
    }

    /// Whether the request ended somewhere other than where it started.
    ///
    /// A trailing slash difference does not count as a redirect.
    pub fn was_redirected(&self) -> bool {
        self.requested_url.trim_end_matches('/') != self.final_url.trim_end_matches('/')
    }
}

/// Streaming artifact body. Nothing is read until the stream is polled.
pub type ArtifactBody = Pin<Box<dyn Stream<Item = FetchResult<Bytes>> + Send>>;

/// Response to an artifact GET, with redirects already followed.
pub struct ArtifactResponse {
    /// The URL after following redirects; its last segment names the file.
    pub final_url: String,
    /// Declared body length, if the server sent one.
    pub content_length: Option<u64>,
    /// The body stream.
    pub body: ArtifactBody,
}

impl fmt::Debug for ArtifactResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactResponse")
            .field("final_url", &self.final_url)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for retrieving pages and artifacts over HTTP.
///
/// Implementations follow redirects and report the final URL. They do not
/// retry; retry policy belongs to the pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page and return its text.
    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage>;

    /// GET an artifact and return its final URL and body stream.
    async fn fetch_artifact(&self, url: &str) -> FetchResult<ArtifactResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_detection_ignores_trailing_slash() {
        let page = FetchedPage::redirected("https://a/apk/x/y/", "https://a/apk/x/y", "");
        assert!(!page.was_redirected());

        let page = FetchedPage::redirected("https://a/apk/x/y/", "https://a/apk/x/y/download/", "");
        assert!(page.was_redirected());

        assert!(!FetchedPage::ok("https://a", "<html/>").was_redirected());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            url: "https://a/b".to_string(),
            status: 403,
        };
        assert_eq!(err.to_string(), "request to https://a/b failed with status 403");
    }
}
