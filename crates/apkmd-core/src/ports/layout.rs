//! Site URL scheme port.

use crate::domain::App;

/// Knows where an app's pages live on the site.
pub trait SiteLayout: Send + Sync {
    /// The release listing page of `app`.
    fn repo_url(&self, app: &App) -> String;

    /// The variants page of one literal `version` of `app`.
    ///
    /// `None` when no URL can be derived (empty slugs or version).
    fn variants_url(&self, app: &App, version: &str) -> Option<String>;
}
