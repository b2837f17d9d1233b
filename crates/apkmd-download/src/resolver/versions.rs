//! Listing page -> matching releases.

use apkmd_core::{DownloadResult, Version, VersionSelector};
use tracing::debug;

use super::SiteClient;

/// Resolves a selector against a project's listing page.
#[derive(Clone)]
pub struct VersionResolver {
    client: SiteClient,
}

impl VersionResolver {
    pub const fn new(client: SiteClient) -> Self {
        Self { client }
    }

    /// Releases on `listing_url` selected by `selector`, in page order.
    ///
    /// An empty result is not an error; the caller decides how to report it.
    pub async fn resolve(
        &self,
        listing_url: &str,
        selector: &VersionSelector,
        header_hint: Option<&str>,
    ) -> DownloadResult<Vec<Version>> {
        let listed = self
            .client
            .fetch_listing(listing_url, |parser, page| {
                parser.parse_versions(&page.body, header_hint)
            })
            .await?;

        let selected = select_versions(&listed, selector);
        debug!(
            url = listing_url,
            %selector,
            listed = listed.len(),
            selected = selected.len(),
            "Versions resolved"
        );
        Ok(selected)
    }
}

/// Apply `selector` to a listing, keeping page order.
///
/// `latest` yields at most the first entry; every other selector keeps all
/// entries whose name it matches.
pub fn select_versions(listed: &[Version], selector: &VersionSelector) -> Vec<Version> {
    match selector {
        VersionSelector::Latest => listed.first().cloned().into_iter().collect(),
        other => listed
            .iter()
            .filter(|version| other.matches_name(&version.name))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::pacing::Pacer;
    use crate::testing::{FakeFetcher, JsonParser, versions_page};
    use std::sync::Arc;

    fn listing() -> Vec<Version> {
        vec![
            Version::new("App 1.3.0 alpha", "https://site.test/v130a"),
            Version::new("App 1.2.0 beta", "https://site.test/v120b"),
            Version::new("App 1.1.0 stable", "https://site.test/v110"),
            Version::new("App 1.0.0", "https://site.test/v100"),
        ]
    }

    #[test]
    fn test_latest_is_first_entry() {
        let selected = select_versions(&listing(), &VersionSelector::Latest);
        assert_eq!(selected, vec![listing()[0].clone()]);
        assert!(select_versions(&[], &VersionSelector::Latest).is_empty());
    }

    #[test]
    fn test_channel_tokens() {
        let stable = select_versions(&listing(), &VersionSelector::Stable);
        assert_eq!(
            stable.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["App 1.1.0 stable", "App 1.0.0"]
        );

        let beta = select_versions(&listing(), &VersionSelector::Beta);
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].name, "App 1.2.0 beta");

        let alpha = select_versions(&listing(), &VersionSelector::Alpha);
        assert_eq!(alpha[0].url, "https://site.test/v130a");
    }

    #[test]
    fn test_pattern_selector() {
        let selector = VersionSelector::pattern(r"1\.[01]\.0").unwrap();
        let selected = select_versions(&listing(), &selector);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].name, "App 1.1.0 stable");
    }

    #[test]
    fn test_selection_is_subset_of_listing() {
        let all = listing();
        for selector in [
            VersionSelector::Latest,
            VersionSelector::Beta,
            VersionSelector::Alpha,
            VersionSelector::Stable,
        ] {
            let selected = select_versions(&all, &selector);
            assert!(selected.iter().all(|v| all.contains(v)), "{selector}");
        }
    }

    #[tokio::test]
    async fn test_stable_scenario() {
        let listing_url = "https://site.test/apk/x/y/";
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.page(
            listing_url,
            versions_page(&[
                ("1.2.0 beta", "https://site.test/apk/x/y/y-1-2-0-release/"),
                ("1.1.0 stable", "https://site.test/apk/x/y/y-1-1-0-release/"),
            ]),
        );
        let resolver = VersionResolver::new(SiteClient::new(
            fetcher,
            Arc::new(JsonParser),
            PipelineConfig::without_delays(),
            Pacer::default(),
        ));

        let versions = resolver
            .resolve(listing_url, &VersionSelector::Stable, None)
            .await
            .unwrap();

        assert_eq!(
            versions,
            vec![Version::new(
                "1.1.0 stable",
                "https://site.test/apk/x/y/y-1-1-0-release/"
            )]
        );
    }
}
