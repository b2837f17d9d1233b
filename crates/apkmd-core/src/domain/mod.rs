//! Domain types for the release listing site.
//!
//! Pure data: no I/O, no networking. Everything here is produced or consumed
//! by the resolution pipeline in `apkmd-download`.

mod app;
mod options;
mod release;
mod report;

pub use app::App;
pub use options::{
    ARCH_NOARCH, ARCH_UNIVERSAL, DPI_ANY, DPI_WILDCARD, DownloadOptions, OptionsOverlay,
    VersionSelector, is_universal_arch,
};
pub use release::{Variant, Version};
pub use report::{DownloadOutcome, DownloadReport, Pass, PipelineWarning, VariantReport};
