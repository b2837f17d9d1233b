//! Path utilities for apkmd data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately

mod error;
mod platform;

#[cfg(test)]
mod test_utils;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, FAILURE_STORE_FILE, data_root, failure_store_path};
