//! Markup extraction for listing, variants, and download pages.
//!
//! This module provides sync parsing functions that turn raw page markup
//! into `Version` and `Variant` records. Extraction is regex-based and
//! anchored on the class names the site uses for its list widgets and
//! tables.

use std::sync::LazyLock;

use apkmd_core::{DocumentParser, ParseError, Variant, Version, contains_challenge_marker};
use regex::Regex;
use tracing::debug;

use crate::error::ScrapeResult;
use crate::urls::SiteUrls;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhref\s*=\s*"([^"]*)""#).expect("href pattern is valid"));

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*"([^"]*)""#).expect("class pattern is valid"));

static ANCHOR_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("anchor pattern is valid"));

static ROW_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="[^"]*\bappRowTitle\b[^"]*"[^>]*>\s*<a\b([^>]*)>(.*?)</a>"#)
        .expect("row title pattern is valid")
});

static WIDGET_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h5[^>]*class="widgetHeader"[^>]*>(.*?)</h5>"#)
        .expect("widget header pattern is valid")
});

static BADGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="[^"]*\bapkm-badge\b[^"]*"[^>]*>(.*?)<"#)
        .expect("badge pattern is valid")
});

static VERSION_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("version number pattern is valid"));

const ALL_VERSIONS_ANCHOR: &str = r#"name="all_versions""#;
const LIST_WIDGET: &str = r#"class="listWidget"#;
const APP_ROW: &str = r#"class="appRow""#;
const VARIANT_ROW: &str = r#"class="table-row headerFont"#;
const TABLE_CELL: &str = r#"class="table-cell"#;

// ============================================================================
// Parser
// ============================================================================

/// `DocumentParser` for the listing site's markup.
#[derive(Debug, Clone)]
pub struct MarkupParser {
    urls: SiteUrls,
}

impl MarkupParser {
    /// Create a parser that resolves relative links against `base_url`.
    pub fn new(base_url: &str) -> ScrapeResult<Self> {
        Ok(Self {
            urls: SiteUrls::new(base_url)?,
        })
    }

    pub const fn with_urls(urls: SiteUrls) -> Self {
        Self { urls }
    }
}

fn reject_challenge(html: &str) -> Result<(), ParseError> {
    if contains_challenge_marker(html) {
        return Err(ParseError::ChallengeDetected);
    }
    Ok(())
}

impl DocumentParser for MarkupParser {
    fn parse_versions(
        &self,
        html: &str,
        header_hint: Option<&str>,
    ) -> Result<Vec<Version>, ParseError> {
        reject_challenge(html)?;

        let section = versions_section(html, header_hint)
            .ok_or_else(|| ParseError::unrecognized("could not find versions table"))?;

        let versions: Vec<Version> = section
            .split(APP_ROW)
            .skip(1)
            .filter_map(|row| {
                let caps = ROW_TITLE_RE.captures(row)?;
                let href = attr(&HREF_RE, &caps[1])?;
                let name = text_of(&caps[2]);
                if name.is_empty() || href.is_empty() {
                    return None;
                }
                Some(Version::new(name, self.urls.absolute(&href)))
            })
            .collect();

        debug!(count = versions.len(), "Parsed versions");
        Ok(versions)
    }

    fn parse_variants(&self, html: &str) -> Result<Vec<Variant>, ParseError> {
        reject_challenge(html)?;

        if !html.contains(VARIANT_ROW) {
            return Err(ParseError::unrecognized("could not find variants table"));
        }

        let variants: Vec<Variant> = html
            .split(VARIANT_ROW)
            .skip(1)
            .filter_map(|row| self.parse_variant_row(row))
            .collect();

        debug!(count = variants.len(), "Parsed variants");
        Ok(variants)
    }

    fn parse_download_links(&self, html: &str) -> Result<Vec<String>, ParseError> {
        reject_challenge(html)?;

        let mut links: Vec<String> = Vec::new();
        for tag in ANCHOR_OPEN_RE.find_iter(html) {
            let tag = tag.as_str();
            let Some(href) = attr(&HREF_RE, tag) else {
                continue;
            };
            let is_button = attr(&CLASS_RE, tag)
                .is_some_and(|class| class.split_whitespace().any(|c| c == "downloadButton"));
            let is_direct = href.contains("download.php") || tag.contains(r#"id="download-link""#);

            if is_button || is_direct {
                let link = self.urls.absolute(&href);
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }

        debug!(count = links.len(), "Parsed download links");
        Ok(links)
    }
}

impl MarkupParser {
    /// One row of the variants table; header and malformed rows yield `None`.
    fn parse_variant_row(&self, row: &str) -> Option<Variant> {
        let cells: Vec<&str> = row.split(TABLE_CELL).skip(1).collect();
        let first = cells.first()?;

        let anchor = ANCHOR_OPEN_RE.find(first)?;
        let href = attr(&HREF_RE, anchor.as_str())?;
        if href.is_empty() {
            return None;
        }

        let kind = BADGE_RE
            .captures(first)
            .map(|caps| text_of(&caps[1]).to_lowercase())
            .filter(|kind| !kind.is_empty());

        let arch = cells.get(1).map(|cell| cell_text(cell)).filter(|s| !s.is_empty());
        let min_android_version = cells
            .get(2)
            .and_then(|cell| VERSION_NUMBER_RE.find(&cell_text(cell)).map(|m| m.as_str().to_string()));
        let dpi = cells.get(3).map(|cell| cell_text(cell)).filter(|s| !s.is_empty());

        Some(Variant {
            url: self.urls.absolute(&href),
            arch,
            dpi,
            min_android_version,
            kind,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// The slice of the page holding the version rows.
///
/// Prefers the "all versions" widget; otherwise the widget whose header
/// reads `header_hint`, falling back to the first widget header.
fn versions_section<'a>(html: &'a str, header_hint: Option<&str>) -> Option<&'a str> {
    if let Some(start) = html.find(ALL_VERSIONS_ANCHOR) {
        return Some(until_next_widget(&html[start..]));
    }

    let hint = header_hint?;
    let headers: Vec<_> = WIDGET_HEADER_RE.captures_iter(html).collect();
    let chosen = headers
        .iter()
        .find(|caps| text_of(&caps[1]) == hint)
        .or_else(|| {
            debug!(expected = hint, "No widget header matches, using the first one");
            headers.first()
        })?;

    let end = chosen.get(0)?.end();
    Some(until_next_widget(&html[end..]))
}

fn until_next_widget(rest: &str) -> &str {
    rest.find(LIST_WIDGET).map_or(rest, |end| &rest[..end])
}

fn attr(re: &Regex, tag: &str) -> Option<String> {
    re.captures(tag).map(|caps| decode_entities(&caps[1]))
}

/// Text of a cell fragment that starts inside the cell's class attribute.
fn cell_text(cell: &str) -> String {
    let content = cell.split_once('>').map_or("", |(_, rest)| rest);
    let content = content.split("</div>").next().unwrap_or(content);
    text_of(content)
}

/// Strip tags, decode common entities, and collapse whitespace.
fn text_of(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
