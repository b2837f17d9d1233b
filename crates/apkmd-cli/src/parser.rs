//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Download Android release artifacts from a release listing site.
#[derive(Parser)]
#[command(name = "apkmd")]
#[command(about = "Download Android release artifacts from a release listing site")]
#[command(version)]
pub struct Cli {
    /// Failure-store file to use instead of the one in the data directory
    #[arg(long = "failure-store", global = true, env = "APKMD_FAILURE_STORE")]
    pub failure_store: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Default tracing filter for this invocation.
    pub const fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
