//! Download options and their layered resolution.
//!
//! Options come from three layers, later layers winning:
//! `DownloadOptions::defaults()` < constructor overlay < call overlay.
//! A field that is `None` in an overlay never shadows a lower layer.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;

/// Requested arch meaning "architecture-independent builds only".
pub const ARCH_UNIVERSAL: &str = "universal";
/// Synonym of [`ARCH_UNIVERSAL`].
pub const ARCH_NOARCH: &str = "noarch";
/// Requested dpi meaning "no density filtering".
pub const DPI_WILDCARD: &str = "*";
/// Synonym of [`DPI_WILDCARD`].
pub const DPI_ANY: &str = "any";

/// Whether an arch string names an architecture-independent build.
pub fn is_universal_arch(arch: &str) -> bool {
    matches!(arch.trim(), ARCH_UNIVERSAL | ARCH_NOARCH)
}

// ============================================================================
// Version Selector
// ============================================================================

/// How to choose releases from a listing page.
#[derive(Debug, Clone)]
pub enum VersionSelector {
    /// An exact version string; version resolution is skipped entirely.
    Literal(String),
    /// The first entry in page order.
    Latest,
    /// Entries tagged `beta`.
    Beta,
    /// Entries tagged `alpha`.
    Alpha,
    /// Entries tagged neither `beta` nor `alpha`.
    Stable,
    /// Entries whose name matches the pattern.
    Pattern(Regex),
}

impl VersionSelector {
    /// Build a pattern selector.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Whether a listing entry name is selected by this token or pattern.
    ///
    /// `Latest` is positional and matches every name; callers take the first.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            Self::Literal(version) => name == version,
            Self::Latest => true,
            Self::Beta => is_beta_name(name),
            Self::Alpha => is_alpha_name(name),
            Self::Stable => !is_beta_name(name) && !is_alpha_name(name),
            Self::Pattern(re) => re.is_match(name),
        }
    }
}

fn is_beta_name(name: &str) -> bool {
    name.contains("beta")
}

fn is_alpha_name(name: &str) -> bool {
    name.contains("alpha")
}

impl FromStr for VersionSelector {
    type Err = Infallible;

    /// Parse a selection token; anything else is a literal version.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "latest" => Self::Latest,
            "beta" => Self::Beta,
            "alpha" => Self::Alpha,
            "stable" => Self::Stable,
            other => Self::Literal(other.to_string()),
        })
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(version) => f.write_str(version),
            Self::Latest => f.write_str("latest"),
            Self::Beta => f.write_str("beta"),
            Self::Alpha => f.write_str("alpha"),
            Self::Stable => f.write_str("stable"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

// ============================================================================
// Resolved Options
// ============================================================================

/// Fully resolved options for one `download` call.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Package type filter (`apk`, `bundle`).
    pub package_type: String,
    /// Release selection.
    pub version: VersionSelector,
    /// `universal`, `noarch`, or a specific arch token.
    pub arch: String,
    /// `*`, `any`, or a specific density bucket.
    pub dpi: String,
    /// Highest acceptable declared minimum Android version.
    pub min_android_version: Option<String>,
    /// Directory artifacts are written to.
    pub out_dir: PathBuf,
    /// Fixed output file name; the artifact's extension is enforced on it.
    pub out_file: Option<String>,
    /// Replace existing files at the destination.
    pub overwrite: bool,
    /// Retry failure-store entries after the primary pass.
    pub retry_download_failures: bool,
}

impl DownloadOptions {
    /// Built-in defaults, the lowest layer.
    pub fn defaults() -> Self {
        Self {
            package_type: "apk".to_string(),
            version: VersionSelector::Stable,
            arch: ARCH_UNIVERSAL.to_string(),
            dpi: "nodpi".to_string(),
            min_android_version: None,
            out_dir: PathBuf::from("."),
            out_file: None,
            overwrite: true,
            retry_download_failures: true,
        }
    }

    /// Resolve defaults plus the given overlays, lowest first.
    pub fn layered<'a>(overlays: impl IntoIterator<Item = &'a OptionsOverlay>) -> Self {
        overlays
            .into_iter()
            .fold(Self::defaults(), |options, overlay| options.apply(overlay))
    }

    /// Apply one overlay on top of these options.
    #[must_use]
    pub fn apply(mut self, overlay: &OptionsOverlay) -> Self {
        if let Some(ref value) = overlay.package_type {
            self.package_type.clone_from(value);
        }
        if let Some(ref value) = overlay.version {
            self.version = value.clone();
        }
        if let Some(ref value) = overlay.arch {
            self.arch.clone_from(value);
        }
        if let Some(ref value) = overlay.dpi {
            self.dpi.clone_from(value);
        }
        if overlay.min_android_version.is_some() {
            self.min_android_version.clone_from(&overlay.min_android_version);
        }
        if let Some(ref value) = overlay.out_dir {
            self.out_dir.clone_from(value);
        }
        if overlay.out_file.is_some() {
            self.out_file.clone_from(&overlay.out_file);
        }
        if let Some(value) = overlay.overwrite {
            self.overwrite = value;
        }
        if let Some(value) = overlay.retry_download_failures {
            self.retry_download_failures = value;
        }
        self
    }

    /// Whether the arch filter keeps universal variants only.
    pub fn wants_universal_arch(&self) -> bool {
        is_universal_arch(&self.arch)
    }

    /// Whether the dpi filter is disabled.
    pub fn accepts_any_dpi(&self) -> bool {
        matches!(self.dpi.as_str(), DPI_WILDCARD | DPI_ANY)
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self::defaults()
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// A partial set of options; `None` fields leave lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct OptionsOverlay {
    pub package_type: Option<String>,
    pub version: Option<VersionSelector>,
    pub arch: Option<String>,
    pub dpi: Option<String>,
    pub min_android_version: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub out_file: Option<String>,
    pub overwrite: Option<bool>,
    pub retry_download_failures: Option<bool>,
}

impl OptionsOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_package_type(mut self, value: impl Into<String>) -> Self {
        self.package_type = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, value: VersionSelector) -> Self {
        self.version = Some(value);
        self
    }

    #[must_use]
    pub fn with_arch(mut self, value: impl Into<String>) -> Self {
        self.arch = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_dpi(mut self, value: impl Into<String>) -> Self {
        self.dpi = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_min_android_version(mut self, value: impl Into<String>) -> Self {
        self.min_android_version = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_out_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_out_file(mut self, value: impl Into<String>) -> Self {
        self.out_file = Some(value.into());
        self
    }

    #[must_use]
    pub const fn with_overwrite(mut self, value: bool) -> Self {
        self.overwrite = Some(value);
        self
    }

    #[must_use]
    pub const fn with_retry_download_failures(mut self, value: bool) -> Self {
        self.retry_download_failures = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_tokens_parse() {
        assert!(matches!("latest".parse::<VersionSelector>(), Ok(VersionSelector::Latest)));
        assert!(matches!("beta".parse::<VersionSelector>(), Ok(VersionSelector::Beta)));
        assert!(matches!("alpha".parse::<VersionSelector>(), Ok(VersionSelector::Alpha)));
        assert!(matches!("stable".parse::<VersionSelector>(), Ok(VersionSelector::Stable)));

        let literal: VersionSelector = "1.2.0".parse().unwrap();
        assert!(matches!(literal, VersionSelector::Literal(ref v) if v == "1.2.0"));
        assert_eq!(literal.to_string(), "1.2.0");
    }

    #[test]
    fn test_channel_matching_is_case_sensitive() {
        assert!(VersionSelector::Beta.matches_name("App 1.2.0 beta"));
        assert!(!VersionSelector::Beta.matches_name("App 1.2.0 Beta"));
        assert!(VersionSelector::Alpha.matches_name("App 2.0 alpha"));
        assert!(VersionSelector::Stable.matches_name("App 1.1.0 stable"));
        assert!(VersionSelector::Stable.matches_name("App 1.1.0"));
        assert!(!VersionSelector::Stable.matches_name("App 1.2.0 beta"));
        assert!(!VersionSelector::Stable.matches_name("App 1.3.0 alpha"));
    }

    #[test]
    fn test_pattern_selector() {
        let selector = VersionSelector::pattern(r"^App 1\.1").unwrap();
        assert!(selector.matches_name("App 1.1.0"));
        assert!(!selector.matches_name("App 1.2.0"));
        assert_eq!(selector.to_string(), r"/^App 1\.1/");
        assert!(VersionSelector::pattern("(").is_err());
    }

    #[test]
    fn test_defaults() {
        let options = DownloadOptions::defaults();
        assert_eq!(options.package_type, "apk");
        assert!(matches!(options.version, VersionSelector::Stable));
        assert_eq!(options.arch, "universal");
        assert_eq!(options.dpi, "nodpi");
        assert!(options.overwrite);
        assert!(options.retry_download_failures);
        assert_eq!(options.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_later_layers_win() {
        let constructor = OptionsOverlay::new()
            .with_arch("arm64-v8a")
            .with_out_dir("/tmp/ctor");
        let call = OptionsOverlay::new().with_arch("x86_64");

        let options = DownloadOptions::layered([&constructor, &call]);
        assert_eq!(options.arch, "x86_64");
        assert_eq!(options.out_dir, PathBuf::from("/tmp/ctor"));
    }

    #[test]
    fn test_absent_fields_do_not_shadow() {
        let constructor = OptionsOverlay::new()
            .with_min_android_version("8.0")
            .with_overwrite(false);
        let call = OptionsOverlay::new().with_dpi("*");

        let options = DownloadOptions::layered([&constructor, &call]);
        assert_eq!(options.min_android_version.as_deref(), Some("8.0"));
        assert!(!options.overwrite);
        assert!(options.accepts_any_dpi());
        assert_eq!(options.package_type, "apk");
    }

    #[test]
    fn test_arch_and_dpi_helpers() {
        let mut options = DownloadOptions::defaults();
        assert!(options.wants_universal_arch());
        options.arch = "noarch".to_string();
        assert!(options.wants_universal_arch());
        options.arch = "arm64-v8a".to_string();
        assert!(!options.wants_universal_arch());

        assert!(!options.accepts_any_dpi());
        options.dpi = "any".to_string();
        assert!(options.accepts_any_dpi());
    }
}
