//! Target project descriptor.

use serde::{Deserialize, Serialize};

/// Identifies a project on the listing site.
///
/// `org` and `repo` are the URL slugs used by the site (for example
/// `google-inc` / `chrome`). `list_header` is the visible header text of the
/// listing widget, used as a fallback when the page has no "all versions"
/// widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// Organization slug.
    pub org: String,
    /// Repository slug.
    pub repo: String,
    /// Optional listing header text hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_header: Option<String>,
}

impl App {
    /// Create an app descriptor from its organization and repository slugs.
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            list_header: None,
        }
    }

    /// Attach the listing header text hint.
    #[must_use]
    pub fn with_list_header(mut self, header: impl Into<String>) -> Self {
        self.list_header = Some(header.into());
        self
    }

    /// `org/repo`, used in log lines and warnings.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}
