//! Best-effort local mirror of the signed-in profile.
//!
//! Nothing here is authoritative. Failures are logged and swallowed so they
//! never hold up a session transition.

use crate::store::KeyValueStore;
use crate::types::{CachedProfile, Session};

/// Store key holding the cached profile record.
pub const PROFILE_KEY: &str = "user";

/// Writes and clears the [`CachedProfile`] record under [`PROFILE_KEY`].
#[derive(Debug)]
pub struct ProfileCache<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> ProfileCache<K> {
    #[must_use]
    pub fn new(store: K) -> Self {
        Self {
            store,
            key: PROFILE_KEY.to_owned(),
        }
    }

    /// Override the record key (default: [`PROFILE_KEY`]).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Create or overwrite the record for `session`.
    pub async fn write(&self, session: &Session) {
        let json = match serde_json::to_string(&CachedProfile::from(session)) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, uid = %session.uid, "Profile serialization failed");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &json).await {
            tracing::warn!(error = %e, key = %self.key, uid = %session.uid, "Profile cache write failed");
        } else {
            tracing::debug!(key = %self.key, uid = %session.uid, "Profile cached");
        }
    }

    /// Delete the record.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            tracing::warn!(error = %e, key = %self.key, "Profile cache clear failed");
        } else {
            tracing::debug!(key = %self.key, "Profile cache cleared");
        }
    }

    /// Read the record back, e.g. to prefill UI before the provider reports in.
    ///
    /// Missing, unreadable and corrupt records all read as `None`.
    pub async fn read(&self) -> Option<CachedProfile> {
        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "Profile cache read failed");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| {
                tracing::warn!(error = %e, key = %self.key, "Ignoring corrupt cached profile");
            })
            .ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};

    /// Store whose writes can be switched to fail.
    #[derive(Debug, Default)]
    pub(crate) struct FlakyStore {
        pub(crate) inner: MemoryStore,
        pub(crate) failing: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            Ok(())
        }
    }

    impl KeyValueStore for FlakyStore {
        async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.check()?;
            self.inner.set(key, value).await
        }

        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn remove(&self, key: &str) -> StoreResult<()> {
            self.check()?;
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn write_then_clear() {
        let cache = ProfileCache::new(MemoryStore::new());
        let session = Session::new("u1").with_email("a@b.com");

        cache.write(&session).await;
        let raw = cache.store().get(PROFILE_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "uid": "u1",
                "email": "a@b.com",
                "displayName": null,
                "photoURL": null,
            })
        );

        cache.clear().await;
        assert_eq!(cache.store().get(PROFILE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_overwrites_previous_profile() {
        let cache = ProfileCache::new(MemoryStore::new());
        cache.write(&Session::new("u1")).await;
        cache.write(&Session::new("u2").with_display_name("Bo")).await;

        let profile = cache.read().await.unwrap();
        assert_eq!(profile.uid.as_str(), "u2");
        assert_eq!(profile.display_name.as_deref(), Some("Bo"));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let cache = ProfileCache::new(MemoryStore::new());
        cache.clear().await;
        cache.clear().await;
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let cache = ProfileCache::new(FlakyStore::default());
        cache.write(&Session::new("u1")).await;

        cache.store().failing.store(true, Ordering::SeqCst);
        cache.write(&Session::new("u2")).await;
        cache.clear().await;

        // Stale, not lost.
        assert_eq!(cache.read().await.unwrap().uid.as_str(), "u1");
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_none() {
        let cache = ProfileCache::new(MemoryStore::new()).with_key("profile");
        cache.store().set("profile", "not json").await.unwrap();

        assert_eq!(cache.key(), "profile");
        assert!(cache.read().await.is_none());
    }
}
