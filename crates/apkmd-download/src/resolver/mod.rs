//! Page resolvers: listing -> versions -> variants -> artifact URL.
//!
//! All three resolvers share a [`SiteClient`], which owns the fetch-and-parse
//! retry loop for pages the site may answer with a challenge.

mod final_url;
mod variants;
mod versions;

use std::sync::Arc;

use apkmd_core::{DocumentParser, DownloadError, DownloadResult, FetchedPage, PageFetcher, ParseError};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::pacing::Pacer;

pub use final_url::FinalUrlResolver;
pub use variants::{VariantListing, VariantResolver, filter_variants, parse_float_prefix};
pub use versions::{VersionResolver, select_versions};

/// HTTP status codes that will not change on retry.
const PERMANENT_STATUSES: &[u16] = &[400, 401, 404, 410];

/// Fetcher, parser and pacing shared by the resolvers.
#[derive(Clone)]
pub struct SiteClient {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn DocumentParser>,
    config: PipelineConfig,
    pacer: Pacer,
}

impl SiteClient {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn DocumentParser>,
        config: PipelineConfig,
        pacer: Pacer,
    ) -> Self {
        Self {
            fetcher,
            parser,
            config,
            pacer,
        }
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch `url` and extract records with `extract`.
    ///
    /// Challenges and transient network failures are retried up to
    /// `max_listing_attempts` times with `challenge_backoff` in between.
    /// Exhausting the attempts returns the last failure. Unrecognized markup
    /// and permanent HTTP statuses fail immediately.
    pub async fn fetch_listing<T, F>(&self, url: &str, extract: F) -> DownloadResult<T>
    where
        F: Fn(&dyn DocumentParser, &FetchedPage) -> Result<T, ParseError>,
    {
        let max_attempts = self.config.max_listing_attempts;
        let mut last_error = DownloadError::other(format!("no attempt made for {url}"));

        for attempt in 1..=max_attempts {
            let fetched = self.pacer.run(self.fetcher.fetch_page(url)).await?;

            let failure = match fetched {
                Ok(page) => match extract(self.parser.as_ref(), &page) {
                    Ok(records) => {
                        debug!(url, attempt, "Listing page parsed");
                        return Ok(records);
                    }
                    Err(ParseError::ChallengeDetected) => DownloadError::challenge(url, attempt),
                    Err(ParseError::Unrecognized { message }) => {
                        return Err(DownloadError::parse(format!("{url}: {message}")));
                    }
                },
                Err(e) => {
                    let err = DownloadError::from(e);
                    if !is_transient(&err) {
                        return Err(err);
                    }
                    err
                }
            };

            if attempt < max_attempts {
                warn!(
                    url,
                    attempt,
                    max_attempts,
                    backoff_secs = self.config.challenge_backoff.as_secs(),
                    error = %failure,
                    "Listing fetch failed, backing off"
                );
                self.pacer.sleep(self.config.challenge_backoff).await?;
            }
            last_error = failure;
        }

        Err(last_error)
    }
}

fn is_transient(err: &DownloadError) -> bool {
    match err {
        DownloadError::Network {
            status_code: Some(status),
            ..
        } => !PERMANENT_STATUSES.contains(status),
        other => other.is_retryable_in_place(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CHALLENGE_PAGE, FakeFetcher, JsonParser, versions_page};
    use apkmd_core::{FetchError, Version};
    use std::time::Duration;
    use tokio::time::Instant;

    const LISTING: &str = "https://site.test/apk/x/y/";

    fn client(fetcher: Arc<FakeFetcher>, attempts: u32) -> SiteClient {
        SiteClient::new(
            fetcher,
            Arc::new(JsonParser),
            PipelineConfig::without_delays().with_max_listing_attempts(attempts),
            Pacer::default(),
        )
    }

    fn parse_versions(
        parser: &dyn DocumentParser,
        page: &FetchedPage,
    ) -> Result<Vec<Version>, ParseError> {
        parser.parse_versions(&page.body, None)
    }

    #[tokio::test]
    async fn test_challenge_is_retried_until_page_loads() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page_sequence(
            LISTING,
            vec![
                Ok(FetchedPage::ok(LISTING, CHALLENGE_PAGE)),
                Ok(FetchedPage::ok(LISTING, CHALLENGE_PAGE)),
                Ok(FetchedPage::ok(LISTING, versions_page(&[("App 1.0", "https://site.test/v1")]))),
            ],
        );

        let versions = client(fetcher.clone(), 10)
            .fetch_listing(LISTING, parse_versions)
            .await
            .unwrap();

        assert_eq!(versions.len(), 1);
        assert_eq!(fetcher.page_fetches(LISTING), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_separates_attempts() {
        let backoff = Duration::from_secs(30);
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page_sequence(
            LISTING,
            vec![
                Ok(FetchedPage::ok(LISTING, CHALLENGE_PAGE)),
                Ok(FetchedPage::ok(LISTING, CHALLENGE_PAGE)),
                Ok(FetchedPage::ok(LISTING, versions_page(&[]))),
            ],
        );
        let client = SiteClient::new(
            fetcher.clone(),
            Arc::new(JsonParser),
            PipelineConfig::without_delays().with_challenge_backoff(backoff),
            Pacer::default(),
        );

        let started = Instant::now();
        client.fetch_listing(LISTING, parse_versions).await.unwrap();

        assert_eq!(fetcher.page_fetches(LISTING), 3);
        assert_eq!(started.elapsed().as_secs(), (backoff * 2).as_secs());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_backoff_after_last_attempt() {
        let backoff = Duration::from_secs(30);
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page(LISTING, CHALLENGE_PAGE);
        let client = SiteClient::new(
            fetcher,
            Arc::new(JsonParser),
            PipelineConfig::without_delays()
                .with_challenge_backoff(backoff)
                .with_max_listing_attempts(2),
            Pacer::default(),
        );

        let started = Instant::now();
        let result = client.fetch_listing(LISTING, parse_versions).await;

        assert_eq!(result, Err(DownloadError::challenge(LISTING, 2)));
        assert_eq!(started.elapsed().as_secs(), backoff.as_secs());
    }

    #[tokio::test]
    async fn test_challenge_exhausts_attempts() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page(LISTING, CHALLENGE_PAGE);

        let result = client(fetcher.clone(), 4)
            .fetch_listing(LISTING, parse_versions)
            .await;

        assert_eq!(result, Err(DownloadError::challenge(LISTING, 4)));
        assert_eq!(fetcher.page_fetches(LISTING), 4);
    }

    #[tokio::test]
    async fn test_unrecognized_markup_is_not_retried() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page(LISTING, "<html>maintenance</html>");

        let result = client(fetcher.clone(), 10)
            .fetch_listing(LISTING, parse_versions)
            .await;

        assert!(matches!(result, Err(DownloadError::Parse { .. })));
        assert_eq!(fetcher.page_fetches(LISTING), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page_sequence(
            LISTING,
            vec![Err(FetchError::Status {
                url: LISTING.to_string(),
                status: 404,
            })],
        );

        let result = client(fetcher.clone(), 10)
            .fetch_listing(LISTING, parse_versions)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::Network {
                status_code: Some(404),
                ..
            })
        ));
        assert_eq!(fetcher.page_fetches(LISTING), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page_sequence(
            LISTING,
            vec![
                Err(FetchError::Status {
                    url: LISTING.to_string(),
                    status: 429,
                }),
                Ok(FetchedPage::ok(LISTING, versions_page(&[]))),
            ],
        );

        let versions = client(fetcher.clone(), 10)
            .fetch_listing(LISTING, parse_versions)
            .await
            .unwrap();

        assert!(versions.is_empty());
        assert_eq!(fetcher.page_fetches(LISTING), 2);
    }
}
