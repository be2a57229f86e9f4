//! Per-client submission throttling backed by a [`CounterStore`].
//!
//! [`RateLimiter`] does the store round-trip around the pure
//! [`zest_core::rate_limit::evaluate`]. It fails open: with no store, or
//! when the store errors, the request is allowed and a warning is logged.
//!
//! The `get` then `put` pair is not atomic. Two simultaneous requests from
//! one client can both read the same record and both be allowed. The
//! limiter is abuse protection, not an exact counter, so this is accepted.

use std::sync::Arc;

use chrono::Utc;
use zest_core::rate_limit::{evaluate, rate_limit_key, Decision, RateLimitPolicy};
use zest_store::CounterStore;

/// Backend name reported when no store is configured.
pub const DISABLED_BACKEND: &str = "disabled";

#[derive(Clone)]
pub struct RateLimiter {
    store: Option<Arc<dyn CounterStore>>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, policy: RateLimitPolicy) -> Self {
        Self {
            store: Some(store),
            policy,
        }
    }

    /// A limiter that allows everything.
    pub fn disabled(policy: RateLimitPolicy) -> Self {
        Self {
            store: None,
            policy,
        }
    }

    /// Name of the store backend, or [`DISABLED_BACKEND`].
    pub fn backend(&self) -> &'static str {
        self.store.as_ref().map_or(DISABLED_BACKEND, |s| s.backend())
    }

    /// Whether the store answers. A disabled limiter is always healthy.
    pub async fn is_healthy(&self) -> bool {
        match &self.store {
            Some(store) => store.ping().await.is_ok(),
            None => true,
        }
    }

    /// Record a submission attempt from `client` at the current time.
    pub async fn check(&self, client: &str) -> Decision {
        self.check_at(client, Utc::now().timestamp()).await
    }

    /// Record a submission attempt from `client` at `now` (unix seconds).
    pub async fn check_at(&self, client: &str, now: i64) -> Decision {
        let Some(store) = &self.store else {
            tracing::debug!(client, "Rate limit store not configured, skipping check");
            return Decision::Allowed;
        };

        let key = rate_limit_key(client);

        let current = match store.get(&key).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(client, error = %e, "Rate limit store read failed, allowing request");
                return Decision::Allowed;
            }
        };

        let outcome = evaluate(current.as_ref(), now, &self.policy);

        if let Some(write) = outcome.write {
            if let Err(e) = store.put(&key, &write.record, write.ttl_secs).await {
                tracing::warn!(client, error = %e, "Rate limit store write failed");
            }
        }

        outcome.decision
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
