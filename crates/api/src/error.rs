use axum::http::header::RETRY_AFTER;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use zest_core::error::CoreError;
use zest_mail::MailError;

use crate::response::json_with_cors;

/// Generic message for every 500. Internal detail stays in the logs.
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit feedback. Please try again later.";

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so each failure class maps to one status
/// and JSON body. No variant exposes provider or internal detail.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `zest_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request used a method other than POST or OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The client is throttled for `retry_after` more seconds.
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// The request body exceeded the accepted size.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The email provider did not accept the notification.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] MailError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }

            AppError::RateLimited { retry_after } => {
                let mut response = json_with_cors(
                    StatusCode::TOO_MANY_REQUESTS,
                    json!({
                        "error": format!(
                            "Rate limit exceeded. Please wait {retry_after} seconds before trying again."
                        ),
                        "retryAfter": retry_after,
                    }),
                );
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, retry_after.into());
                response
            }

            AppError::PayloadTooLarge => {
                error_body(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            }

            AppError::Core(CoreError::MissingFields) => {
                error_body(StatusCode::BAD_REQUEST, &CoreError::MissingFields.to_string())
            }
            AppError::Core(CoreError::Validation(msg)) | AppError::BadRequest(msg) => {
                error_body(StatusCode::BAD_REQUEST, &msg)
            }

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, SUBMIT_FAILED_MESSAGE)
            }
            AppError::Delivery(err) => {
                tracing::error!(error = %err, "Feedback email delivery failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, SUBMIT_FAILED_MESSAGE)
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    json_with_cors(status, json!({ "error": message }))
}
