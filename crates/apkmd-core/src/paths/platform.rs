//! Data directory resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "APKMD_DATA_DIR";

/// File name of the persisted failure store.
pub const FAILURE_STORE_FILE: &str = "failed-downloads.json";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `APKMD_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/apkmd`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;

    let root = data_dir.join("apkmd");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Location of the persisted failure store.
pub fn failure_store_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(FAILURE_STORE_FILE))
}
