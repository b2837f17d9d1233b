//! Per-artifact outcomes and run-level reporting.

use std::fmt;
use std::path::PathBuf;

/// Result of one artifact attempt.
///
/// `destination_path` is `None` only when no final URL could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub destination_path: Option<PathBuf>,
    pub skipped: bool,
}

impl DownloadOutcome {
    /// The artifact was written to `path`.
    pub const fn written(path: PathBuf) -> Self {
        Self {
            destination_path: Some(path),
            skipped: false,
        }
    }

    /// Nothing was written; `path` is where it would have gone.
    pub const fn skipped_at(path: PathBuf) -> Self {
        Self {
            destination_path: Some(path),
            skipped: true,
        }
    }

    /// Nothing was written and no destination is known.
    pub const fn unresolved() -> Self {
        Self {
            destination_path: None,
            skipped: true,
        }
    }
}

/// Which pass of a run produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The pass driven by version and variant resolution.
    Primary,
    /// The end-of-run pass over failure-store entries.
    Retry,
}

/// Outcome of one variant, tagged with its page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantReport {
    pub variant_url: String,
    pub pass: Pass,
    pub outcome: DownloadOutcome,
}

/// Non-fatal conditions surfaced during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// No listing entry matched the version selector.
    NoMatchingVersions { selector: String },
    /// The variants page redirected straight to one build.
    SingleVariantOnly { app: String, url: String },
    /// Every variant was filtered out.
    NoMatchingVariants { variants_url: String },
    /// A listing page could not be retrieved or understood.
    ListingFailed { url: String, reason: String },
    /// A variant failed in a way that is not deferred to the failure store.
    VariantFailed { url: String, reason: String },
    /// A variant was recorded in the failure store for a later attempt.
    Deferred { url: String, reason: String },
    /// The failure store could not be written.
    FailureStorePersist { reason: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingVersions { selector } => {
                write!(f, "could not find any suitable {selector} version")
            }
            Self::SingleVariantOnly { app, url } => {
                write!(f, "only single variant is supported for {app} ({url})")
            }
            Self::NoMatchingVariants { variants_url } => {
                write!(f, "could not find any suitable variant at {variants_url}")
            }
            Self::ListingFailed { url, reason } => {
                write!(f, "failed to load listing {url}: {reason}")
            }
            Self::VariantFailed { url, reason } => {
                write!(f, "failed to download variant {url}: {reason}")
            }
            Self::Deferred { url, reason } => {
                write!(f, "deferred {url} to the failure store: {reason}")
            }
            Self::FailureStorePersist { reason } => {
                write!(f, "failed to persist the failure store: {reason}")
            }
        }
    }
}

/// Everything a `download` run produced.
///
/// A run that partially fails still reports every outcome it completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub outcomes: Vec<VariantReport>,
    pub warnings: Vec<PipelineWarning>,
}

impl DownloadReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes that wrote an artifact.
    pub fn written(&self) -> impl Iterator<Item = &VariantReport> {
        self.outcomes.iter().filter(|r| !r.outcome.skipped)
    }

    /// Outcomes that wrote nothing.
    pub fn skipped(&self) -> impl Iterator<Item = &VariantReport> {
        self.outcomes.iter().filter(|r| r.outcome.skipped)
    }

    /// Whether a warning of the given shape was emitted.
    pub fn has_warning(&self, predicate: impl Fn(&PipelineWarning) -> bool) -> bool {
        self.warnings.iter().any(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let written = DownloadOutcome::written(PathBuf::from("out/a.apk"));
        assert!(!written.skipped);
        assert_eq!(written.destination_path, Some(PathBuf::from("out/a.apk")));

        assert!(DownloadOutcome::skipped_at(PathBuf::from("out/a.apk")).skipped);

        let unresolved = DownloadOutcome::unresolved();
        assert!(unresolved.skipped);
        assert!(unresolved.destination_path.is_none());
    }

    #[test]
    fn test_report_partitions() {
        let mut report = DownloadReport::new();
        report.outcomes.push(VariantReport {
            variant_url: "a".to_string(),
            pass: Pass::Primary,
            outcome: DownloadOutcome::written(PathBuf::from("a.apk")),
        });
        report.outcomes.push(VariantReport {
            variant_url: "b".to_string(),
            pass: Pass::Retry,
            outcome: DownloadOutcome::unresolved(),
        });

        assert_eq!(report.written().count(), 1);
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn test_warning_display() {
        let warning = PipelineWarning::SingleVariantOnly {
            app: "x/y".to_string(),
            url: "https://host/artifact123".to_string(),
        };
        assert!(warning.to_string().contains("only single variant is supported for x/y"));

        let warning = PipelineWarning::NoMatchingVersions {
            selector: "beta".to_string(),
        };
        assert_eq!(warning.to_string(), "could not find any suitable beta version");
    }
}
