//! Markup extraction port.

use thiserror::Error;

use crate::domain::{Variant, Version};

/// Texts the site serves in place of a page when it wants a real browser.
pub const CHALLENGE_MARKERS: &[&str] = &[
    "Enable JavaScript and cookies to continue",
    "Just a moment...",
];

/// Whether raw page content is an anti-automation challenge.
pub fn contains_challenge_marker(html: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Errors reported by a `DocumentParser`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The page is an anti-automation challenge.
    #[error("page cannot be loaded without JavaScript and cookies enabled")]
    ChallengeDetected,

    /// The page did not have the expected structure.
    #[error("unrecognized page: {message}")]
    Unrecognized { message: String },
}

impl ParseError {
    pub fn unrecognized(message: impl Into<String>) -> Self {
        Self::Unrecognized {
            message: message.into(),
        }
    }
}

/// Converts raw page content into structured records.
///
/// Every method must report `ChallengeDetected` when the content carries a
/// challenge marker, before attempting any extraction.
pub trait DocumentParser: Send + Sync {
    /// Release entries of a listing page, in page order.
    fn parse_versions(
        &self,
        html: &str,
        header_hint: Option<&str>,
    ) -> Result<Vec<Version>, ParseError>;

    /// Builds listed on a variants page, in page order.
    fn parse_variants(&self, html: &str) -> Result<Vec<Variant>, ParseError>;

    /// Distinct absolute download-link candidates on an interstitial page.
    fn parse_download_links(&self, html: &str) -> Result<Vec<String>, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_marker_detection() {
        assert!(contains_challenge_marker(
            "<p>Enable JavaScript and cookies to continue</p>"
        ));
        assert!(contains_challenge_marker("<title>Just a moment...</title>"));
        assert!(!contains_challenge_marker("<div class=\"listWidget\"></div>"));
    }
}
