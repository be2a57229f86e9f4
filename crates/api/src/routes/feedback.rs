//! Route definitions for feedback submission.
//!
//! Mounted under `/api/v1` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Largest accepted request body. Four text fields at their length cap
/// fit with room for JSON escaping. Enforced by the handler after the
/// rate-limit check.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Feedback routes.
///
/// ```text
/// POST     /feedback  -> submit_feedback
/// OPTIONS  /feedback  -> preflight
/// *        /feedback  -> method_not_allowed (405)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/feedback",
        post(feedback::submit_feedback)
            .options(feedback::preflight)
            .fallback(feedback::method_not_allowed),
    )
}
