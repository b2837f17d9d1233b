//! Release resolution and artifact retrieval pipeline.
//!
//! # Architecture
//!
//! ```text
//! Downloader (orchestrator, owns one FailureStore per run)
//!         │
//!         ├── VersionResolver   listing page  -> [Version]
//!         ├── VariantResolver   variants page -> [Variant] | redirect
//!         ├── FinalUrlResolver  interstitial  -> artifact URL
//!         ├── artifact          naming + streaming writes
//!         └── FailureStore      persisted URLs to retry at end of run
//! ```
//!
//! All network access is sequential. Listing fetches go through
//! `SiteClient`, which retries anti-automation challenges with a long
//! backoff; every delay and fetch can be interrupted through a
//! `CancellationToken`.

#![deny(unused_crate_dependencies)]

mod artifact;
mod config;
mod failure_store;
mod orchestrator;
mod pacing;
mod resolver;

#[cfg(test)]
mod testing;

pub use apkmd_core::{
    App, DownloadError, DownloadOptions, DownloadOutcome, DownloadReport, DownloadResult,
    OptionsOverlay, Pass, PipelineWarning, Variant, VariantReport, Version, VersionSelector,
};

pub use artifact::{
    PLACEHOLDER_FILE_NAMES, destination_path, ensure_extension, file_name_from_url,
    is_placeholder_file, write_artifact,
};
pub use config::PipelineConfig;
pub use failure_store::{FailureStore, FailureStoreError};
pub use orchestrator::{Downloader, DownloaderDeps, Stage};
pub use pacing::Pacer;
pub use resolver::{
    FinalUrlResolver, SiteClient, VariantListing, VariantResolver, VersionResolver,
    filter_variants, parse_float_prefix, select_versions,
};

