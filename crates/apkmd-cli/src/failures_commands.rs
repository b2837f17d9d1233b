//! Failure-store subcommands.

use clap::Subcommand;

/// Inspect or reset the persisted set of deferred variants.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FailuresCommand {
    /// List variant URLs waiting for a retry
    List,
    /// Forget every pending variant URL
    Clear,
}
