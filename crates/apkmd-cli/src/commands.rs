//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use apkmd_core::{App, OptionsOverlay, VersionSelector};
use clap::{Args, Subcommand};

use crate::error::CliError;
use crate::failures_commands::FailuresCommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and download the release artifacts of an app
    Download(DownloadArgs),

    /// Inspect or clear the failure store
    Failures {
        #[command(subcommand)]
        command: FailuresCommand,
    },

    /// Show resolved data paths
    Paths,
}

/// Arguments of `apkmd download`.
///
/// Every option is optional so that an unset flag never shadows a value
/// from the environment or the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Organization slug on the listing site (e.g. "google-inc")
    pub org: String,

    /// Repository slug on the listing site (e.g. "chrome")
    pub repo: String,

    /// Header text of the listing widget, for pages without an "all versions" list
    #[arg(long)]
    pub list_header: Option<String>,

    /// Package type to keep: "apk" or "bundle"
    #[arg(long = "type", value_name = "TYPE")]
    pub package_type: Option<String>,

    /// Literal version, or one of "latest", "beta", "alpha", "stable"
    #[arg(long, conflicts_with = "version_pattern")]
    pub version: Option<String>,

    /// Regular expression matched against release names
    #[arg(long, value_name = "REGEX")]
    pub version_pattern: Option<String>,

    /// "universal", "noarch", or an architecture such as "arm64-v8a"
    #[arg(long)]
    pub arch: Option<String>,

    /// "*", "any", or a density bucket such as "nodpi"
    #[arg(long)]
    pub dpi: Option<String>,

    /// Highest acceptable declared minimum Android version (e.g. "8.0")
    #[arg(long)]
    pub min_android_version: Option<String>,

    /// Directory to write artifacts to
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Fixed output file name; the artifact's extension is appended if missing
    #[arg(long)]
    pub out_file: Option<String>,

    /// Keep existing files instead of downloading them again
    #[arg(long)]
    pub no_overwrite: bool,

    /// Do not retry previously deferred variants at the end of the run
    #[arg(long)]
    pub no_retry_failures: bool,
}

impl DownloadArgs {
    /// The target app.
    pub fn app(&self) -> App {
        let app = App::new(&self.org, &self.repo);
        match &self.list_header {
            Some(header) => app.with_list_header(header),
            None => app,
        }
    }

    /// Call-level option overlay.
    pub fn to_overlay(&self) -> Result<OptionsOverlay, CliError> {
        let mut overlay = OptionsOverlay::new();

        if let Some(pattern) = &self.version_pattern {
            let selector = VersionSelector::pattern(pattern).map_err(|e| {
                CliError::Arguments(format!("invalid --version-pattern '{pattern}': {e}"))
            })?;
            overlay = overlay.with_version(selector);
        } else if let Some(version) = &self.version {
            let trimmed = version.trim();
            if trimmed.is_empty() {
                return Err(CliError::Arguments("--version must not be empty".to_string()));
            }
            let Ok(selector) = trimmed.parse::<VersionSelector>();
            overlay = overlay.with_version(selector);
        }

        overlay.package_type.clone_from(&self.package_type);
        overlay.arch.clone_from(&self.arch);
        overlay.dpi.clone_from(&self.dpi);
        overlay.min_android_version.clone_from(&self.min_android_version);
        overlay.out_dir.clone_from(&self.out_dir);
        overlay.out_file.clone_from(&self.out_file);
        if self.no_overwrite {
            overlay = overlay.with_overwrite(false);
        }
        if self.no_retry_failures {
            overlay = overlay.with_retry_download_failures(false);
        }
        Ok(overlay)
    }
}
