//! Paths command handler.
//!
//! Displays resolved paths in `key = value` format for diagnostics.

use std::path::Path;

use anyhow::Result;
use apkmd_core::{DATA_DIR_ENV, data_root};

/// Execute the paths command.
pub fn execute(failure_store_path: &Path) -> Result<()> {
    let root = data_root()?;
    let source = if std::env::var_os(DATA_DIR_ENV).is_some() {
        DATA_DIR_ENV
    } else {
        "system default"
    };
    println!("data_dir = {} ({source})", root.display());
    println!("failure_store = {}", failure_store_path.display());
    Ok(())
}
