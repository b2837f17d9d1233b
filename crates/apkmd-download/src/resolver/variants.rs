//! Variants page -> candidate builds, and the variant filter pipeline.
//!
//! Filters run in a fixed order, each narrowing the set the next one sees:
//! arch, dpi, minimum Android version, package type.

use std::sync::LazyLock;

use apkmd_core::{DownloadOptions, DownloadResult, ParseError, Variant, contains_challenge_marker};
use regex::Regex;
use tracing::debug;

use super::SiteClient;

/// Leading float literal, as accepted by JavaScript's `parseFloat`.
static FLOAT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});

/// What a variants page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantListing {
    /// The site skipped the table and redirected to a single build.
    Redirected { target_url: String },
    /// The variants table, unfiltered, in page order.
    Listed(Vec<Variant>),
}

/// Loads the variants page of one release.
#[derive(Clone)]
pub struct VariantResolver {
    client: SiteClient,
}

impl VariantResolver {
    pub const fn new(client: SiteClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, variants_url: &str) -> DownloadResult<VariantListing> {
        let listing = self
            .client
            .fetch_listing(variants_url, |parser, page| {
                if contains_challenge_marker(&page.body) {
                    return Err(ParseError::ChallengeDetected);
                }
                if page.was_redirected() {
                    return Ok(VariantListing::Redirected {
                        target_url: page.final_url.clone(),
                    });
                }
                parser.parse_variants(&page.body).map(VariantListing::Listed)
            })
            .await?;

        match &listing {
            VariantListing::Redirected { target_url } => {
                debug!(url = variants_url, target = %target_url, "Variants page redirected");
            }
            VariantListing::Listed(variants) => {
                debug!(url = variants_url, count = variants.len(), "Variants listed");
            }
        }
        Ok(listing)
    }
}

/// Run the full filter pipeline over a listed variants table.
pub fn filter_variants(variants: Vec<Variant>, options: &DownloadOptions) -> Vec<Variant> {
    let total = variants.len();

    let variants = filter_by_arch(variants, &options.arch, options.wants_universal_arch());
    debug!(arch = %options.arch, count = variants.len(), "After arch filter");

    let variants = filter_by_dpi(variants, options);
    debug!(dpi = %options.dpi, count = variants.len(), "After dpi filter");

    let requested_min = options
        .min_android_version
        .as_deref()
        .filter(|requested| !requested.trim().is_empty());
    let variants = match requested_min {
        Some(requested) => {
            let kept = filter_by_min_android_version(variants, requested);
            debug!(min_android_version = requested, count = kept.len(), "After minAndroidVersion filter");
            kept
        }
        None => variants,
    };

    let variants: Vec<Variant> = variants
        .into_iter()
        .filter(|v| v.kind.as_deref() == Some(options.package_type.as_str()))
        .collect();
    debug!(package_type = %options.package_type, total, count = variants.len(), "After type filter");

    variants
}

fn filter_by_arch(variants: Vec<Variant>, arch: &str, universal_only: bool) -> Vec<Variant> {
    let universal = |v: &Variant| v.is_universal();
    if universal_only {
        return variants.into_iter().filter(universal).collect();
    }

    let matches_arch = arch_token_matcher(arch);
    let (matched, rest): (Vec<Variant>, Vec<Variant>) =
        variants.into_iter().partition(|v| {
            matches_arch
                .as_ref()
                .zip(v.arch.as_deref())
                .is_some_and(|(re, declared)| re.is_match(declared))
        });

    if matched.is_empty() {
        debug!(arch, "No variant for requested arch, falling back to universal");
        rest.into_iter().filter(universal).collect()
    } else {
        matched
    }
}

/// Whole-token matcher for a requested arch.
///
/// An empty request degenerates to `\b\b`, which accepts any declared arch
/// containing a word character.
fn arch_token_matcher(arch: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(arch.trim()))).ok()
}

fn filter_by_dpi(variants: Vec<Variant>, options: &DownloadOptions) -> Vec<Variant> {
    if options.accepts_any_dpi() {
        return variants;
    }
    variants
        .into_iter()
        .filter(|v| v.dpi.as_deref() == Some(options.dpi.as_str()))
        .collect()
}

fn filter_by_min_android_version(variants: Vec<Variant>, requested: &str) -> Vec<Variant> {
    let Some(limit) = parse_float_prefix(requested) else {
        return Vec::new();
    };
    variants
        .into_iter()
        .filter(|v| {
            v.min_android_version
                .as_deref()
                .and_then(parse_float_prefix)
                .is_some_and(|declared| declared <= limit)
        })
        .collect()
}

/// Longest leading float literal of `s`, ignoring leading whitespace.
///
/// `"8.0+"` is 8.0 and `"Android 8"` is `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned.starts_with("Infinity") {
        return Some(if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    FLOAT_PREFIX_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
