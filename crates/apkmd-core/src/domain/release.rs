//! Release entries scraped from listing and variants pages.

use serde::{Deserialize, Serialize};

/// One release entry on a listing page.
///
/// `url` points to that release's variants page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Display name, e.g. `Chrome 126.0.6478.71 beta`.
    pub name: String,
    /// Absolute URL of the variants page.
    pub url: String,
}

impl Version {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One downloadable build of a release.
///
/// `url` points to an interstitial page, not the binary itself. A variant
/// synthesized from a redirect only carries `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Interstitial page URL.
    pub url: String,
    /// Declared architecture(s), e.g. `arm64-v8a + armeabi-v7a`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Declared screen density bucket, e.g. `nodpi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<String>,
    /// Declared minimum Android version, e.g. `8.0`.
    #[serde(
        default,
        rename = "minAndroidVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_android_version: Option<String>,
    /// Declared package type, e.g. `apk` or `bundle`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Variant {
    /// A variant known only by its page URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Whether the variant declares itself as architecture-independent.
    pub fn is_universal(&self) -> bool {
        self.arch
            .as_deref()
            .is_some_and(super::options::is_universal_arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_variant_has_only_url() {
        let variant = Variant::from_url("https://host/artifact123");
        assert_eq!(variant.url, "https://host/artifact123");
        assert!(variant.arch.is_none());
        assert!(variant.dpi.is_none());
        assert!(variant.kind.is_none());
        assert!(!variant.is_universal());
    }

    #[test]
    fn test_universal_detection() {
        let universal = Variant {
            arch: Some(" universal ".to_string()),
            ..Variant::from_url("u")
        };
        let noarch = Variant {
            arch: Some("noarch".to_string()),
            ..Variant::from_url("n")
        };
        let arm = Variant {
            arch: Some("arm64-v8a".to_string()),
            ..Variant::from_url("a")
        };
        assert!(universal.is_universal());
        assert!(noarch.is_universal());
        assert!(!arm.is_universal());
    }

    #[test]
    fn test_variant_json_field_names() {
        let json = r#"{"url":"u","arch":"x86","minAndroidVersion":"7.0","type":"apk"}"#;
        let variant: Variant = serde_json::from_str(json).unwrap();
        assert_eq!(variant.min_android_version.as_deref(), Some("7.0"));
        assert_eq!(variant.kind.as_deref(), Some("apk"));
        assert!(variant.dpi.is_none());
    }
}
