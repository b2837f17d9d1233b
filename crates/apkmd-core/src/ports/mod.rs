//! Port definitions (trait abstractions).
//!
//! The pipeline only talks to the outside world through these traits:
//!
//! - `PageFetcher` - HTTP GET of pages and artifact streams
//! - `DocumentParser` - markup to structured records
//! - `SiteLayout` - page URLs for an app
//!
//! Adapters live in `apkmd-scrape`; tests use in-memory fakes.

mod fetch;
mod layout;
mod parser;

pub use fetch::{ArtifactBody, ArtifactResponse, FetchError, FetchResult, FetchedPage, PageFetcher};
pub use layout::SiteLayout;
pub use parser::{CHALLENGE_MARKERS, DocumentParser, ParseError, contains_challenge_marker};
