//! Counter store backends for the feedback rate limiter.
//!
//! The limiter only needs two operations: read a client's
//! [`RateLimitRecord`] and write it back with an expiry. [`CounterStore`]
//! captures exactly that so the API crate can hold an
//! `Arc<dyn CounterStore>` and tests can swap in [`MemoryStore`].
//!
//! - [`MemoryStore`] -- single-process map with per-entry expiry.
//! - [`RedisStore`] -- shared store for multi-instance deployments.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use zest_core::rate_limit::RateLimitRecord;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Error type for counter store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection or command failure talking to Redis.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored value could not be encoded or decoded.
    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value store holding rate-limit records with store-side expiry.
///
/// Implementations do not need to be atomic across a `get`/`put` pair;
/// the limiter tolerates the resulting race.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Fetch the record for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Store `record` under `key`, expiring it after `ttl_secs` seconds.
    async fn put(&self, key: &str, record: &RateLimitRecord, ttl_secs: u64)
        -> Result<(), StoreError>;

    /// Short backend name for health output and logs.
    fn backend(&self) -> &'static str;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
