//! Command-line adapter for apkmd.
//!
//! `main.rs` is the composition root; everything it needs is exposed here
//! so argument parsing and handlers can be tested without a process.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod failures_commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, DownloadArgs};
pub use error::CliError;
pub use failures_commands::FailuresCommand;
pub use parser::Cli;
