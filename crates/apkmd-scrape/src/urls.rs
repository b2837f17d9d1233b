//! URL construction helpers for the listing site.
//!
//! Pure functions over a parsed base URL, so every page URL the pipeline
//! visits is built the same way.

use apkmd_core::{App, SiteLayout};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};

/// Page URL builder rooted at the site base URL.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    /// Create a builder for `base_url`.
    pub fn new(base_url: &str) -> ScrapeResult<Self> {
        let base = Url::parse(base_url).map_err(|source| ScrapeError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self { base })
    }

    fn root(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Make a page link absolute. Absolute links are returned unchanged.
    ///
    /// Links that cannot be resolved are returned as given.
    pub fn absolute(&self, href: &str) -> String {
        self.base
            .join(href)
            .map_or_else(|_| href.to_string(), |url| url.to_string())
    }
}

impl SiteLayout for SiteUrls {
    fn repo_url(&self, app: &App) -> String {
        format!("{}/apk/{}/{}/", self.root(), app.org, app.repo)
    }

    fn variants_url(&self, app: &App, version: &str) -> Option<String> {
        let version = version.trim();
        if app.org.is_empty() || app.repo.is_empty() || version.is_empty() {
            return None;
        }
        Some(format!(
            "{}/apk/{}/{}/{}-{}-release/",
            self.root(),
            app.org,
            app.repo,
            app.repo,
            version.replace('.', "-")
        ))
    }
}
