//! In-process counter store.
//!
//! Suitable for a single relay instance and for tests. Entries expire
//! lazily: an expired entry is dropped when it is next read, and
//! [`MemoryStore::purge_expired`] sweeps the whole map.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use zest_core::rate_limit::RateLimitRecord;

use crate::{CounterStore, StoreError};

#[derive(Debug, Clone, Copy)]
struct Entry {
    record: RateLimitRecord,
    expires_at: Instant,
}

/// Counter store backed by a mutex-guarded `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.record)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        record: &RateLimitRecord,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let entry = Entry {
            record: *record,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(count: u32) -> RateLimitRecord {
        RateLimitRecord {
            count,
            first_request: 1_700_000_000,
            blocked_until: None,
        }
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("ratelimit:nobody").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_then_get_returns_record() {
        let store = MemoryStore::new();
        store.put("ratelimit:a", &record(1), 60).await.unwrap();
        assert_eq!(store.get("ratelimit:a").await.unwrap(), Some(record(1)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn put_overwrites_previous_record() {
        let store = MemoryStore::new();
        store.put("ratelimit:a", &record(1), 60).await.unwrap();
        store.put("ratelimit:a", &record(2), 60).await.unwrap();
        assert_eq!(store.get("ratelimit:a").await.unwrap(), Some(record(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::new();
        store.put("ratelimit:a", &record(1), 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get("ratelimit:a").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get("ratelimit:a").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired_entries() {
        let store = MemoryStore::new();
        store.put("ratelimit:short", &record(1), 10).await.unwrap();
        store.put("ratelimit:long", &record(1), 120).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("ratelimit:long").await.unwrap().is_some());
    }

    #[test]
    fn backend_name() {
        assert_eq!(MemoryStore::new().backend(), "memory");
    }
}
