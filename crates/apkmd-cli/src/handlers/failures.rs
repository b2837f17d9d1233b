//! Failure-store handler.

use std::path::Path;

use anyhow::Result;
use apkmd_download::FailureStore;

use crate::failures_commands::FailuresCommand;

/// Execute a `failures` subcommand against the store at `path`.
pub fn execute(path: &Path, command: &FailuresCommand) -> Result<()> {
    let mut store = FailureStore::open(path);
    match command {
        FailuresCommand::List => {
            let pending = store.pending_urls();
            if pending.is_empty() {
                println!("No pending failures in {}", path.display());
            }
            for url in pending {
                println!("{url}");
            }
        }
        FailuresCommand::Clear => {
            let count = store.clear_all()?;
            println!("Cleared {count} pending failure(s) from {}", path.display());
        }
    }
    Ok(())
}
