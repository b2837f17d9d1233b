//! Persisted set of variant URLs awaiting a retry.
//!
//! Format: a single JSON object mapping variant-page URL to `true`.
//!
//! ```text
//! {
//!   "https://www.apkmirror.com/apk/x/y/y-1-0-release/y-1-0-android-apk-download/": true
//! }
//! ```
//!
//! Every mutation is flushed with temp file + rename before returning, so a
//! crash loses at most the mutation in flight.

use std::fs;
use std::io;
use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while persisting the store.
#[derive(Debug, Error)]
pub enum FailureStoreError {
    #[error("failed to write failure store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize failure store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-presence map of failed variant URLs.
///
/// Insertion order is kept so the retry pass revisits URLs in the order they
/// failed.
#[derive(Debug)]
pub struct FailureStore {
    path: PathBuf,
    entries: IndexMap<String, bool>,
}

impl FailureStore {
    /// An empty store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: IndexMap::new(),
        }
    }

    /// Create a store and load it from `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    /// Replace in-memory state with the persisted file.
    ///
    /// A missing file is an empty store. A corrupt file is logged and also
    /// treated as empty; it is overwritten on the next mutation.
    pub fn load(&mut self) {
        self.entries = match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<IndexMap<String, bool>>(&content) {
                Ok(map) => map.into_iter().filter(|(_, failed)| *failed).collect(),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Ignoring corrupt failure store");
                    IndexMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failure store unreadable, starting empty");
                IndexMap::new()
            }
        };
        debug!(path = %self.path.display(), count = self.entries.len(), "Failure store loaded");
    }

    /// Mark `url` as failed and persist.
    pub fn record(&mut self, url: &str) -> Result<(), FailureStoreError> {
        self.entries.insert(url.to_string(), true);
        self.persist()
    }

    /// Forget `url` and persist. Returns whether it was present.
    ///
    /// Clearing an absent URL does not touch the file.
    pub fn clear(&mut self, url: &str) -> Result<bool, FailureStoreError> {
        if self.entries.shift_remove(url).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Forget every URL and persist.
    pub fn clear_all(&mut self) -> Result<usize, FailureStoreError> {
        let count = self.entries.len();
        self.entries.clear();
        self.persist()?;
        Ok(count)
    }

    /// URLs currently marked as failed, oldest first.
    pub fn pending_urls(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), FailureStoreError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        let io_err = |source| FailureStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut temp_name = self.path.clone().into_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, content).map_err(io_err)?;
        fs::rename(&temp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio_test::assert_ok;

    const A: &str = "https://site.test/apk/x/y/y-1-0-release/y-1-0-android-apk-download/";
    const B: &str = "https://site.test/apk/x/y/y-1-1-release/y-1-1-android-apk-download/";

    #[test]
    fn test_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let store = FailureStore::open(temp.path().join("failed-downloads.json"));
        assert!(store.is_empty());
        assert!(store.pending_urls().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("failed-downloads.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = FailureStore::open(&path);
        assert!(store.is_empty());

        assert_ok!(store.record(A));
        let reloaded = FailureStore::open(&path);
        assert_eq!(reloaded.pending_urls(), vec![A.to_string()]);
    }

    #[test]
    fn test_record_clear_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("state/failed-downloads.json");
        let mut store = FailureStore::open(&path);

        assert_ok!(store.record(A));
        assert_ok!(store.record(B));
        assert!(store.contains(A));
        assert_eq!(store.pending_urls(), vec![A.to_string(), B.to_string()]);

        assert!(assert_ok!(store.clear(A)));
        assert!(!store.contains(A));
        assert!(!assert_ok!(store.clear(A)));

        let reloaded = FailureStore::open(&path);
        assert_eq!(reloaded.pending_urls(), vec![B.to_string()]);
    }

    #[test]
    fn test_persisted_format() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("failed-downloads.json");
        let mut store = FailureStore::new(&path);
        assert_ok!(store.record(A));

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[A], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_false_entries_are_not_pending() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("failed-downloads.json");
        fs::write(&path, format!(r#"{{"{A}": true, "{B}": false}}"#)).unwrap();

        let store = FailureStore::open(&path);
        assert_eq!(store.pending_urls(), vec![A.to_string()]);
    }

    #[test]
    fn test_clear_all() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("failed-downloads.json");
        let mut store = FailureStore::open(&path);
        assert_ok!(store.record(A));
        assert_ok!(store.record(B));

        assert_eq!(assert_ok!(store.clear_all()), 2);
        assert!(FailureStore::open(&path).is_empty());
    }
}
