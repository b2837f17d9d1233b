//! Adapters for the release listing site.
//!
//! - [`ReqwestFetcher`] implements `PageFetcher` over reqwest
//! - [`MarkupParser`] implements `DocumentParser` for the site's markup
//! - [`SiteUrls`] builds listing and variants page URLs
//!
//! Page formats are brittle by nature; everything format-specific lives here
//! so the pipeline contracts in `apkmd-download` stay untouched when the
//! site changes.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod error;
mod http;
mod parsing;
mod urls;

// ============================================================================
// Public API
// ============================================================================

pub use config::{DEFAULT_BASE_URL, ScrapeClientConfig};
pub use error::{ScrapeError, ScrapeResult};
pub use http::ReqwestFetcher;
pub use parsing::MarkupParser;
pub use urls::SiteUrls;
