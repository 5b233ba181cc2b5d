//! Local key-value persistence used by the profile cache.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be mapped onto the backend.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Stored bytes are not valid text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Backend refused the operation (quota, read-only medium, etc.).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Async string key-value store.
///
/// # Example
///
/// ```rust,ignore
/// impl KeyValueStore for PrefsStore {
///     async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
///         self.prefs.put(key, value).await.map_err(|e| StoreError::Unavailable(e.to_string()))
///     }
///     // ...
/// }
/// ```
pub trait KeyValueStore: Send + Sync + 'static {
    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Volatile store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the store root. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key == "."
            || key.contains("..")
        {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::Encoding(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        store.set("user", "{}").await.unwrap();
        assert_eq!(store.get("user").await.unwrap().as_deref(), Some("{}"));

        store.remove("user").await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), None);

        // Idempotent removal.
        store.remove("user").await.unwrap();
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("prefs");

        FileStore::new(&root).set("user", "{\"uid\":\"u1\"}").await.unwrap();

        let reopened = FileStore::new(&root);
        assert_eq!(
            reopened.get("user").await.unwrap().as_deref(),
            Some("{\"uid\":\"u1\"}")
        );
        assert!(root.join("user.json").exists());
        assert!(!root.join("user.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_overwrite_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("user", "one").await.unwrap();
        store.set("user", "two").await.unwrap();
        assert_eq!(store.get("user").await.unwrap().as_deref(), Some("two"));

        store.remove("user").await.unwrap();
        store.remove("user").await.unwrap();
        assert_eq!(store.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_missing_dir_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));

        assert_eq!(store.get("user").await.unwrap(), None);
        store.remove("user").await.unwrap();
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", "a\\b", "."] {
            assert!(
                matches!(store.set(key, "x").await, Err(StoreError::InvalidKey(_))),
                "key should be rejected: {key:?}"
            );
        }
    }
}
