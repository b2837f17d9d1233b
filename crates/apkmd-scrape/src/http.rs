//! HTTP backend for the listing site.
//!
//! Production `PageFetcher` over reqwest. Redirects are followed by the
//! client and the final URL is reported back, which is how the pipeline
//! notices that a variants page jumped straight to a single build.
//! No retries happen here; retry policy belongs to the pipeline.

use std::time::Duration;

use apkmd_core::{ArtifactResponse, FetchError, FetchResult, FetchedPage, PageFetcher};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use tracing::debug;
use url::Url;

use crate::config::ScrapeClientConfig;
use crate::error::ScrapeResult;

/// Production HTTP backend using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &ScrapeClientConfig) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Send a GET and fail on non-success statuses.
    async fn get(&self, url: &str) -> FetchResult<reqwest::Response> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.map_send_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    fn map_send_error(&self, url: &str, err: &reqwest::Error) -> FetchError {
        let message = if err.is_timeout() {
            format!("timed out after {}s", self.timeout.as_secs())
        } else {
            err.to_string()
        };
        FetchError::Network {
            url: url.to_string(),
            message,
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        let response = self.get(url).await?;
        let final_url = response.url().to_string();
        let status = response.status().as_u16();

        let body = response.text().await.map_err(|e| FetchError::Io {
            message: format!("failed to read {url}: {e}"),
        })?;

        debug!(url, final_url = %final_url, bytes = body.len(), "Fetched page");

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status,
            body,
        })
    }

    async fn fetch_artifact(&self, url: &str) -> FetchResult<ArtifactResponse> {
        let response = self.get(url).await?;
        let final_url = response.url().to_string();
        let content_length = response.content_length();

        debug!(url, final_url = %final_url, ?content_length, "Artifact response received");

        let body = response
            .bytes_stream()
            .map_err(|e| FetchError::Io {
                message: e.to_string(),
            });

        Ok(ArtifactResponse {
            final_url,
            content_length,
            body: Box::pin(body),
        })
    }
}
