//! Core domain types and port definitions for apkmd.
//!
//! This crate holds everything the resolution-and-retrieval pipeline needs to
//! talk about releases without knowing how pages are fetched or parsed:
//!
//! - `domain` - apps, versions, variants, layered download options, reports
//! - `download` - the pipeline error taxonomy
//! - `ports` - `PageFetcher` and `DocumentParser` trait abstractions
//! - `paths` - data directory and failure-store file resolution

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod download;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    App, DownloadOptions, DownloadOutcome, DownloadReport, OptionsOverlay, Pass,
    PipelineWarning, Variant, VariantReport, Version, VersionSelector,
};
pub use download::{DownloadError, DownloadResult};
pub use paths::{DATA_DIR_ENV, FAILURE_STORE_FILE, PathError, data_root, failure_store_path};
pub use ports::{
    ArtifactBody, ArtifactResponse, CHALLENGE_MARKERS, DocumentParser, FetchError, FetchResult,
    FetchedPage, PageFetcher, ParseError, SiteLayout, contains_challenge_marker,
};
