//! Fakes for the fetcher, parser and layout ports.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apkmd_core::{
    App, ArtifactResponse, DocumentParser, FetchError, FetchResult, FetchedPage, PageFetcher,
    ParseError, SiteLayout, Variant, Version, contains_challenge_marker,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use serde::de::DeserializeOwned;

/// Body the site serves while it wants a real browser.
pub const CHALLENGE_PAGE: &str =
    "<html><title>Just a moment...</title><p>Enable JavaScript and cookies to continue</p></html>";

pub const BASE: &str = "https://site.test";

/// Canned artifact response.
#[derive(Clone)]
struct CannedArtifact {
    final_url: String,
    body: Vec<u8>,
}

/// A fake fetcher serving canned pages and artifacts.
///
/// A page may have a sequence of responses; the last one repeats. Unknown
/// URLs answer 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, VecDeque<FetchResult<FetchedPage>>>>,
    artifacts: Mutex<HashMap<String, CannedArtifact>>,
    page_fetches: Mutex<HashMap<String, usize>>,
    artifact_fetches: Mutex<HashMap<String, usize>>,
    body_polls: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url` with status 200.
    pub fn page(&self, url: &str, body: impl Into<String>) {
        self.page_sequence(url, vec![Ok(FetchedPage::ok(url, body))]);
    }

    /// Serve `responses` in order at `url`.
    pub fn page_sequence(&self, url: &str, responses: Vec<FetchResult<FetchedPage>>) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
    }

    /// Serve an artifact at `url`, reached after redirects at `final_url`.
    pub fn artifact(&self, url: &str, final_url: &str, body: &[u8]) {
        self.artifacts.lock().unwrap().insert(
            url.to_string(),
            CannedArtifact {
                final_url: final_url.to_string(),
                body: body.to_vec(),
            },
        );
    }

    pub fn page_fetches(&self, url: &str) -> usize {
        self.page_fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn artifact_fetches(&self, url: &str) -> usize {
        self.artifact_fetches
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// How many artifact bodies were actually read.
    pub fn body_polls(&self) -> usize {
        self.body_polls.load(Ordering::SeqCst)
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        *self
            .page_fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let mut pages = self.pages.lock().unwrap();
        let queue = pages.get_mut(url).ok_or_else(|| Self::not_found(url))?;
        if queue.len() > 1 {
            queue.pop_front().ok_or_else(|| Self::not_found(url))?
        } else {
            queue.front().cloned().ok_or_else(|| Self::not_found(url))?
        }
    }

    async fn fetch_artifact(&self, url: &str) -> FetchResult<ArtifactResponse> {
        *self
            .artifact_fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let canned = self
            .artifacts
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))?;

        let polls = Arc::clone(&self.body_polls);
        let body = canned.body;
        let stream = stream::once(async move {
            polls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(body))
        });

        Ok(ArtifactResponse {
            final_url: canned.final_url,
            content_length: None,
            body: Box::pin(stream),
        })
    }
}

/// Parser reading JSON pages produced by the `*_page` helpers.
pub struct JsonParser;

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ParseError> {
    if contains_challenge_marker(body) {
        return Err(ParseError::ChallengeDetected);
    }
    serde_json::from_str(body).map_err(|e| ParseError::unrecognized(e.to_string()))
}

impl DocumentParser for JsonParser {
    fn parse_versions(
        &self,
        html: &str,
        _header_hint: Option<&str>,
    ) -> Result<Vec<Version>, ParseError> {
        decode(html)
    }

    fn parse_variants(&self, html: &str) -> Result<Vec<Variant>, ParseError> {
        decode(html)
    }

    fn parse_download_links(&self, html: &str) -> Result<Vec<String>, ParseError> {
        decode(html)
    }
}

/// Layout rooted at [`BASE`].
pub struct FakeLayout;

impl SiteLayout for FakeLayout {
    fn repo_url(&self, app: &App) -> String {
        format!("{BASE}/apk/{}/{}/", app.org, app.repo)
    }

    fn variants_url(&self, app: &App, version: &str) -> Option<String> {
        if app.org.is_empty() || app.repo.is_empty() || version.is_empty() {
            return None;
        }
        Some(format!(
            "{BASE}/apk/{}/{}/{}-{}-release/",
            app.org,
            app.repo,
            app.repo,
            version.replace('.', "-")
        ))
    }
}

pub fn versions_page(entries: &[(&str, &str)]) -> String {
    let versions: Vec<Version> = entries
        .iter()
        .map(|(name, url)| Version::new(*name, *url))
        .collect();
    serde_json::to_string(&versions).unwrap()
}

pub fn variants_page(variants: &[Variant]) -> String {
    serde_json::to_string(variants).unwrap()
}

pub fn links_page(links: &[&str]) -> String {
    serde_json::to_string(links).unwrap()
}
