//! Variant page -> artifact URL.
//!
//! A variant page links to a download page, which in turn carries the
//! direct link. Each page must offer exactly one distinct destination.

use apkmd_core::{DownloadError, DownloadResult};
use tracing::debug;

use super::SiteClient;
use crate::artifact::PLACEHOLDER_FILE_NAMES;

/// Follows interstitial pages until a direct artifact link is found.
#[derive(Clone)]
pub struct FinalUrlResolver {
    client: SiteClient,
}

impl FinalUrlResolver {
    pub const fn new(client: SiteClient) -> Self {
        Self { client }
    }

    /// Resolve the artifact URL behind `variant_url`.
    ///
    /// Fails with `RedirectAmbiguity` when a page offers more than one
    /// destination. If the hop budget runs out, the last link found is
    /// returned and the artifact fetch decides what it is.
    pub async fn resolve(&self, variant_url: &str) -> DownloadResult<String> {
        let max_hops = self.client.config().max_interstitial_hops;
        let mut current = variant_url.to_string();

        for hop in 1..=max_hops {
            let links = self
                .client
                .fetch_listing(&current, |parser, page| {
                    parser.parse_download_links(&page.body)
                })
                .await?;

            let link = match links.as_slice() {
                [] => {
                    return Err(DownloadError::parse(format!(
                        "no download link on {current}"
                    )));
                }
                [only] => only.clone(),
                [_, alternate, ..] => {
                    return Err(DownloadError::redirect_ambiguity(current, alternate.clone()));
                }
            };

            if is_direct_link(&link) || hop == max_hops {
                debug!(variant = variant_url, url = %link, hop, "Final URL resolved");
                return Ok(link);
            }

            debug!(from = %current, to = %link, hop, "Following interstitial");
            current = link;
        }

        Err(DownloadError::other(format!(
            "interstitial hop budget exhausted for {variant_url}"
        )))
    }
}

/// Whether `link` points at the file itself rather than another page.
fn is_direct_link(link: &str) -> bool {
    let path = link.split(['?', '#']).next().unwrap_or_default();
    PLACEHOLDER_FILE_NAMES
        .iter()
        .any(|name| path.ends_with(&format!("/{name}")))
}
