pub mod feedback;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /feedback    POST, OPTIONS (anything else -> 405)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(feedback::router())
}
