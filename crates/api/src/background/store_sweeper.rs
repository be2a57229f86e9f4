//! Periodic cleanup of the in-memory counter store.
//!
//! Redis expires keys on its own. The in-memory store only drops an
//! expired record when that key is read again, so records of clients that
//! never come back would pile up without this sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zest_store::MemoryStore;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(store: Arc<MemoryStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Counter store sweeper started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Counter store sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired rate limit records");
                }
            }
        }
    }
}
