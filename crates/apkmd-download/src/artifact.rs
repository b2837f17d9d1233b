//! Artifact naming and streaming writes.
//!
//! # Atomicity
//! 1. Stream the body into `<destination>.part`
//! 2. Rename to `<destination>`
//!
//! An interrupted transfer leaves only the `.part` file behind, so a later
//! `overwrite = false` run never mistakes a truncated file for a download.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use apkmd_core::{ArtifactBody, DownloadError, DownloadResult};
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// File names the site serves instead of a binary when it wants a browser.
pub const PLACEHOLDER_FILE_NAMES: &[&str] = &["download.php"];

/// Last path segment of `url`, with query and fragment dropped.
///
/// No percent-decoding is applied.
pub fn file_name_from_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let path = without_fragment.split('?').next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Whether a resolved file name is a bot-check placeholder.
pub fn is_placeholder_file(file_name: &str) -> bool {
    PLACEHOLDER_FILE_NAMES
        .iter()
        .any(|placeholder| file_name.eq_ignore_ascii_case(placeholder))
}

/// Append `.ext` to `name` unless it already ends with it.
pub fn ensure_extension(name: &str, ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        return name.to_string();
    }
    let suffix = format!(".{ext}");
    if name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// Where an artifact named `file_name` lands.
///
/// A fixed `out_file` takes the artifact's extension; otherwise the derived
/// name is used as-is.
pub fn destination_path(out_dir: &Path, out_file: Option<&str>, file_name: &str) -> PathBuf {
    match out_file {
        Some(fixed) => {
            let ext = Path::new(file_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            out_dir.join(ensure_extension(fixed, ext))
        }
        None => out_dir.join(file_name),
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Stream `body` to `destination`, returning the number of bytes written.
pub async fn write_artifact(destination: &Path, mut body: ArtifactBody) -> DownloadResult<u64> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::from_io_error(&e))?;
    }

    let temp_path = part_path(destination);
    let result = async {
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| DownloadError::from_io_error(&e))?;
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::from_io_error(&e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DownloadError::from_io_error(&e))?;
        Ok::<_, DownloadError>(written)
    }
    .await;

    match result {
        Ok(written) => {
            fs::rename(&temp_path, destination)
                .await
                .map_err(|e| DownloadError::from_io_error(&e))?;
            debug!(path = %destination.display(), bytes = written, "Artifact written");
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}
