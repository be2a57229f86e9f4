//! Redis-backed counter store.
//!
//! Records are stored as JSON strings with `SET key value EX ttl`, so
//! Redis handles expiry and the keyspace never grows unbounded.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use zest_core::rate_limit::RateLimitRecord;

use crate::{CounterStore, StoreError};

/// Counter store shared by every relay instance pointing at the same Redis.
///
/// Cheap to clone: the underlying [`ConnectionManager`] multiplexes one
/// connection and reconnects on failure.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `url` (`redis://` or `rediss://`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(tls = url.starts_with("rediss://"), "Connected to Redis counter store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        record: &RateLimitRecord,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        // Redis rejects a zero expiry.
        let _: () = conn.set_ex(key, json, ttl_secs.max(1)).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let result = RedisStore::connect("not a redis url").await;
        assert!(matches!(result, Err(StoreError::Redis(_))));
    }

    #[test]
    fn serialization_error_display() {
        let err: StoreError = serde_json::from_str::<RateLimitRecord>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Record serialization error"));
    }
}
