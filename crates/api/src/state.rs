use std::sync::Arc;

use zest_mail::Mailer;

use crate::config::ServerConfig;
use crate::rate_limiter::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Collaborators
/// are injected here so tests can swap in an in-memory store and a fake
/// mailer.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-client submission throttling.
    pub rate_limiter: RateLimiter,
    /// Outbound notification delivery.
    pub mailer: Arc<dyn Mailer>,
}
