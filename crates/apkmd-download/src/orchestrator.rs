//! Download orchestration.
//!
//! One `download()` call walks a fixed sequence of stages:
//!
//! ```text
//! ResolvingVersions -> ResolvingVariants -> ResolvingFinalUrl -> Downloading -> Done
//!                                                                               |
//!                                      RetryingFailures (once, if store non-empty)
//! ```
//!
//! Releases and variants are processed strictly one at a time. Recoverable
//! conditions stay scoped to the release or variant that raised them and
//! become `PipelineWarning`s; only structural errors and cancellation end
//! the call with an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use apkmd_core::{
    App, DocumentParser, DownloadError, DownloadOptions, DownloadOutcome, DownloadReport,
    DownloadResult, OptionsOverlay, PageFetcher, Pass, PipelineWarning, SiteLayout, Variant,
    VariantReport, VersionSelector,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::artifact::{destination_path, file_name_from_url, is_placeholder_file, write_artifact};
use crate::config::PipelineConfig;
use crate::failure_store::FailureStore;
use crate::pacing::Pacer;
use crate::resolver::{
    FinalUrlResolver, SiteClient, VariantListing, VariantResolver, VersionResolver,
    filter_variants,
};

/// Ports the downloader is composed from.
#[derive(Clone)]
pub struct DownloaderDeps {
    pub fetcher: Arc<dyn PageFetcher>,
    pub parser: Arc<dyn DocumentParser>,
    pub layout: Arc<dyn SiteLayout>,
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingVersions,
    ResolvingVariants,
    ResolvingFinalUrl,
    Downloading,
    Done,
    RetryingFailures,
}

/// Entry point of the pipeline.
///
/// Holds the constructor-level option overlay; each `download()` call adds
/// its own overlay on top.
pub struct Downloader {
    deps: DownloaderDeps,
    config: PipelineConfig,
    options: OptionsOverlay,
    failure_store_path: PathBuf,
    pacer: Pacer,
}

impl Downloader {
    /// Create a downloader persisting failures to `failure_store_path`.
    pub fn new(deps: DownloaderDeps, failure_store_path: impl Into<PathBuf>) -> Self {
        Self {
            deps,
            config: PipelineConfig::default(),
            options: OptionsOverlay::default(),
            failure_store_path: failure_store_path.into(),
            pacer: Pacer::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the constructor-level option overlay.
    #[must_use]
    pub fn with_options(mut self, options: OptionsOverlay) -> Self {
        self.options = options;
        self
    }

    /// Stop runs at their next delay or fetch once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.pacer = Pacer::new(token);
        self
    }

    pub fn failure_store_path(&self) -> &Path {
        &self.failure_store_path
    }

    /// Resolved options for a call with overlay `call`.
    pub fn options_for(&self, call: &OptionsOverlay) -> DownloadOptions {
        DownloadOptions::layered([&self.options, call])
    }

    /// Download every variant of `app` selected by the layered options.
    ///
    /// "Nothing matched" conditions are warnings in the report. Errors are
    /// returned only for structural mistakes and cancellation.
    pub async fn download(
        &self,
        app: &App,
        call: &OptionsOverlay,
    ) -> DownloadResult<DownloadReport> {
        let mut report = DownloadReport::new();
        self.download_into(app, call, &mut report).await?;
        Ok(report)
    }

    /// [`download`](Self::download), collecting outcomes and warnings into
    /// `report`.
    ///
    /// On error `report` keeps everything recorded before the failure,
    /// including artifacts already written when the run was cancelled.
    pub async fn download_into(
        &self,
        app: &App,
        call: &OptionsOverlay,
        report: &mut DownloadReport,
    ) -> DownloadResult<()> {
        let options = self.options_for(call);
        let client = SiteClient::new(
            Arc::clone(&self.deps.fetcher),
            Arc::clone(&self.deps.parser),
            self.config.clone(),
            self.pacer.clone(),
        );

        info!(
            app = %app.slug(),
            version = %options.version,
            arch = %options.arch,
            dpi = %options.dpi,
            package_type = %options.package_type,
            "Starting download"
        );

        let mut run = Run {
            store: FailureStore::open(&self.failure_store_path),
            options,
            versions: VersionResolver::new(client.clone()),
            variants: VariantResolver::new(client.clone()),
            final_urls: FinalUrlResolver::new(client),
            fetcher: self.deps.fetcher.as_ref(),
            layout: self.deps.layout.as_ref(),
            pacer: &self.pacer,
            config: &self.config,
            report,
            stage: Stage::ResolvingVersions,
        };

        let result = run.execute(app).await;
        let written = run.report.written().count();
        let skipped = run.report.skipped().count();

        match result {
            Ok(()) => {
                info!(
                    app = %app.slug(),
                    written,
                    skipped,
                    warnings = run.report.warnings.len(),
                    "Download finished"
                );
                Ok(())
            }
            Err(e) => {
                warn!(app = %app.slug(), stage = ?run.stage, written, skipped, error = %e, "Download stopped");
                Err(e)
            }
        }
    }
}

/// Result of one variant attempt that did not fail outright.
enum Attempt {
    Completed(DownloadOutcome),
    /// Recorded in the failure store for a later pass.
    Deferred {
        outcome: DownloadOutcome,
        reason: DownloadError,
    },
}

/// State of a single `download()` call.
struct Run<'a> {
    options: DownloadOptions,
    store: FailureStore,
    versions: VersionResolver,
    variants: VariantResolver,
    final_urls: FinalUrlResolver,
    fetcher: &'a dyn PageFetcher,
    layout: &'a dyn SiteLayout,
    pacer: &'a Pacer,
    config: &'a PipelineConfig,
    report: &'a mut DownloadReport,
    stage: Stage,
}

impl Run<'_> {
    async fn execute(&mut self, app: &App) -> DownloadResult<()> {
        let selector = self.options.version.clone();
        match selector {
            VersionSelector::Literal(ref version) => {
                let variants_url = self.layout.variants_url(app, version).ok_or_else(|| {
                    DownloadError::structural(format!(
                        "cannot derive a variants URL for {} version '{version}'",
                        app.slug()
                    ))
                })?;
                self.process_release(app, &variants_url).await?;
            }
            ref selector => self.process_listing(app, selector).await?,
        }
        self.enter(Stage::Done);

        if self.options.retry_download_failures && !self.store.is_empty() {
            self.retry_failures().await?;
            self.enter(Stage::Done);
        }
        Ok(())
    }

    async fn process_listing(&mut self, app: &App, selector: &VersionSelector) -> DownloadResult<()> {
        self.enter(Stage::ResolvingVersions);
        let listing_url = self.layout.repo_url(app);

        match self
            .versions
            .resolve(&listing_url, selector, app.list_header.as_deref())
            .await
        {
            Ok(versions) if versions.is_empty() => {
                self.warn(PipelineWarning::NoMatchingVersions {
                    selector: selector.to_string(),
                });
            }
            Ok(versions) => {
                for version in versions {
                    info!(app = %app.slug(), version = %version.name, "Processing release");
                    self.process_release(app, &version.url).await?;
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => self.warn(PipelineWarning::ListingFailed {
                url: listing_url,
                reason: e.to_string(),
            }),
        }
        Ok(())
    }

    async fn process_release(&mut self, app: &App, variants_url: &str) -> DownloadResult<()> {
        if variants_url.trim().is_empty() {
            return Err(DownloadError::structural(format!(
                "empty variants URL for {}",
                app.slug()
            )));
        }
        self.enter(Stage::ResolvingVariants);

        let candidates = match self.variants.resolve(variants_url).await {
            Ok(VariantListing::Redirected { target_url }) => {
                self.warn(PipelineWarning::SingleVariantOnly {
                    app: app.slug(),
                    url: target_url.clone(),
                });
                vec![Variant::from_url(target_url)]
            }
            Ok(VariantListing::Listed(listed)) => filter_variants(listed, &self.options),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.warn(PipelineWarning::ListingFailed {
                    url: variants_url.to_string(),
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        if candidates.is_empty() {
            self.warn(PipelineWarning::NoMatchingVariants {
                variants_url: variants_url.to_string(),
            });
            return Ok(());
        }

        for variant in candidates {
            self.process_variant(&variant.url, Pass::Primary).await?;
        }
        Ok(())
    }

    async fn retry_failures(&mut self) -> DownloadResult<()> {
        self.enter(Stage::RetryingFailures);
        let pending = self.store.pending_urls();
        info!(count = pending.len(), "Retrying deferred variants");

        for url in pending {
            self.process_variant(&url, Pass::Retry).await?;
        }
        Ok(())
    }

    async fn process_variant(&mut self, url: &str, pass: Pass) -> DownloadResult<()> {
        match self.attempt(url).await {
            Ok(Attempt::Completed(outcome)) => {
                if self.store.contains(url) {
                    match self.store.clear(url) {
                        Ok(_) => info!(url, "Cleared from failure store"),
                        Err(e) => self.warn(PipelineWarning::FailureStorePersist {
                            reason: e.to_string(),
                        }),
                    }
                }
                let written = !outcome.skipped;
                self.push_outcome(url, pass, outcome);
                if written {
                    self.pacer.sleep(self.config.post_download_delay).await?;
                }
            }
            Ok(Attempt::Deferred { outcome, reason }) => {
                if let Err(e) = self.store.record(url) {
                    self.warn(PipelineWarning::FailureStorePersist {
                        reason: e.to_string(),
                    });
                }
                self.warn(PipelineWarning::Deferred {
                    url: url.to_string(),
                    reason: reason.to_string(),
                });
                self.push_outcome(url, pass, outcome);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => self.warn(PipelineWarning::VariantFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
        Ok(())
    }

    /// Resolve, fetch and write one variant.
    async fn attempt(&mut self, variant_url: &str) -> DownloadResult<Attempt> {
        self.enter(Stage::ResolvingFinalUrl);
        let final_url = match self.final_urls.resolve(variant_url).await {
            Ok(url) => url,
            Err(reason) if reason.is_deferrable() => {
                return Ok(Attempt::Deferred {
                    outcome: DownloadOutcome::unresolved(),
                    reason,
                });
            }
            Err(e) => return Err(e),
        };

        self.enter(Stage::Downloading);
        let response = self.pacer.run(self.fetcher.fetch_artifact(&final_url)).await??;

        let file_name = file_name_from_url(&response.final_url);
        if file_name.is_empty() {
            return Err(DownloadError::parse(format!(
                "no file name in artifact URL {}",
                response.final_url
            )));
        }
        let destination = destination_path(
            &self.options.out_dir,
            self.options.out_file.as_deref(),
            &file_name,
        );

        if is_placeholder_file(&file_name) {
            return Ok(Attempt::Deferred {
                outcome: DownloadOutcome::skipped_at(destination),
                reason: DownloadError::placeholder(response.final_url, file_name),
            });
        }

        if !self.options.overwrite && destination.exists() {
            info!(path = %destination.display(), "Already downloaded, skipping");
            return Ok(Attempt::Completed(DownloadOutcome::skipped_at(destination)));
        }

        let bytes = self
            .pacer
            .run(write_artifact(&destination, response.body))
            .await??;
        info!(path = %destination.display(), bytes, "Downloaded");
        Ok(Attempt::Completed(DownloadOutcome::written(destination)))
    }

    fn push_outcome(&mut self, url: &str, pass: Pass, outcome: DownloadOutcome) {
        self.report.outcomes.push(VariantReport {
            variant_url: url.to_string(),
            pass,
            outcome,
        });
    }

    fn enter(&mut self, stage: Stage) {
        if self.stage != stage {
            debug!(from = ?self.stage, to = ?stage, "Stage transition");
            self.stage = stage;
        }
    }

    fn warn(&mut self, warning: PipelineWarning) {
        warn!("{warning}");
        self.report.warnings.push(warning);
    }
}
