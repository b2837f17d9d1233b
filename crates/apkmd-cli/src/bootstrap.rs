//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - HTTP fetcher (via apkmd-scrape)
//! - Markup parser and URL layout (via apkmd-scrape)
//! - Downloader with constructor-level options (via apkmd-download)
//!
//! Command handlers receive the fully-composed context.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use apkmd_core::{OptionsOverlay, failure_store_path};
use apkmd_download::{Downloader, DownloaderDeps, PipelineConfig};
use apkmd_scrape::{DEFAULT_BASE_URL, MarkupParser, ReqwestFetcher, ScrapeClientConfig, SiteUrls};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Environment variable overriding the listing site base URL.
pub const BASE_URL_ENV: &str = "APKMD_BASE_URL";
pub const ARCH_ENV: &str = "APKMD_ARCH";
pub const DPI_ENV: &str = "APKMD_DPI";
pub const MIN_ANDROID_VERSION_ENV: &str = "APKMD_MIN_ANDROID_VERSION";
pub const OUT_DIR_ENV: &str = "APKMD_OUT_DIR";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Listing site root.
    pub base_url: String,
    /// Persisted failure-store file.
    pub failure_store_path: PathBuf,
    /// Constructor-level options, below per-call flags.
    pub defaults: OptionsOverlay,
}

impl CliConfig {
    /// Resolve configuration from the process environment.
    ///
    /// `failure_store` overrides the failure-store location derived from
    /// the data directory.
    pub fn from_env(failure_store: Option<PathBuf>) -> Result<Self> {
        Self::from_lookup(failure_store, |key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup` instead of the environment.
    pub fn from_lookup(
        failure_store: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let failure_store_path = match failure_store {
            Some(path) => path,
            None => failure_store_path()?,
        };
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut defaults = OptionsOverlay::new();
        defaults.arch = non_empty(ARCH_ENV);
        defaults.dpi = non_empty(DPI_ENV);
        defaults.min_android_version = non_empty(MIN_ANDROID_VERSION_ENV);
        defaults.out_dir = non_empty(OUT_DIR_ENV).map(PathBuf::from);

        Ok(Self {
            base_url: non_empty(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            failure_store_path,
            defaults,
        })
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The download pipeline.
    pub downloader: Downloader,
    /// Failure-store file shared by `download` and `failures`.
    pub failure_store_path: PathBuf,
    /// Fires on Ctrl+C.
    pub cancel: CancellationToken,
}

/// Bootstrap the CLI application.
///
/// This is the composition root. It:
/// 1. Creates the reqwest-backed fetcher
/// 2. Creates the markup parser and URL layout for the site
/// 3. Assembles the downloader with the environment's option overlay
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let client_config = ScrapeClientConfig::new().with_base_url(&config.base_url);

    let fetcher = Arc::new(ReqwestFetcher::new(&client_config)?);
    let parser = Arc::new(MarkupParser::new(client_config.base_url())?);
    let layout = Arc::new(SiteUrls::new(client_config.base_url())?);

    debug!(
        base_url = %config.base_url,
        failure_store = %config.failure_store_path.display(),
        "Composing downloader"
    );

    let cancel = CancellationToken::new();
    let downloader = Downloader::new(
        DownloaderDeps {
            fetcher,
            parser,
            layout,
        },
        &config.failure_store_path,
    )
    .with_config(PipelineConfig::default())
    .with_options(config.defaults)
    .with_cancellation(cancel.clone());

    Ok(CliContext {
        downloader,
        failure_store_path: config.failure_store_path,
        cancel,
    })
}
