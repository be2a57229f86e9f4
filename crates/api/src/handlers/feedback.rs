//! Handlers for the feedback relay endpoint.
//!
//! A submission goes through, in order: rate limit, parse, honeypot,
//! validation, email dispatch. Each step short-circuits with its own
//! response. Preflight and wrong-method requests are answered before any
//! of that and never touch the limiter.

use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use http_body_util::LengthLimitError;
use zest_core::feedback::FeedbackSubmission;
use zest_core::rate_limit::Decision;
use zest_mail::render_feedback_email;

use crate::error::{AppError, AppResult};
use crate::middleware::client_ip::ClientIp;
use crate::response;
use crate::routes::feedback::MAX_BODY_BYTES;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /feedback
// ---------------------------------------------------------------------------

/// Relay one feedback report to the operator's inbox.
///
/// The body stays unread until the rate limit has been checked, so a
/// throttled client is rejected without buffering anything.
pub async fn submit_feedback(
    State(state): State<AppState>,
    ClientIp(client): ClientIp,
    body: Body,
) -> AppResult<Response> {
    if let Decision::Blocked { retry_after } = state.rate_limiter.check(&client).await {
        tracing::info!(client = %client, retry_after, "Feedback submission rate limited");
        return Err(AppError::RateLimited { retry_after });
    }

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            let e = e.into_inner();
            if e.downcast_ref::<LengthLimitError>().is_some() {
                tracing::info!(client = %client, limit = MAX_BODY_BYTES, "Feedback body too large");
                AppError::PayloadTooLarge
            } else {
                tracing::debug!(client = %client, error = %e, "Failed to read feedback body");
                AppError::BadRequest("Invalid request body".into())
            }
        })?;

    let submission: FeedbackSubmission = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(client = %client, error = %e, "Unparseable feedback body");
        AppError::BadRequest("Invalid request body".into())
    })?;

    if submission.is_spam() {
        tracing::warn!(client = %client, "Honeypot field filled, dropping submission");
        return Ok(response::feedback_accepted());
    }

    let feedback = submission.validate()?;

    let message = render_feedback_email(&feedback, &client, Utc::now());
    let sent = state.mailer.send(&message).await?;

    tracing::info!(
        client = %client,
        model_version = feedback.model_version_label(),
        email_id = sent.id.as_deref().unwrap_or("-"),
        "Feedback relayed",
    );

    Ok(response::feedback_accepted())
}

// ---------------------------------------------------------------------------
// OPTIONS /feedback
// ---------------------------------------------------------------------------

/// Answer a CORS preflight.
pub async fn preflight() -> Response {
    response::preflight()
}

// ---------------------------------------------------------------------------
// Any other method
// ---------------------------------------------------------------------------

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
