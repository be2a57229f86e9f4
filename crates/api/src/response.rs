//! Shared response builders for the feedback endpoint.
//!
//! Browser clients call the relay cross-origin from the marketing site, so
//! every JSON response carries `Access-Control-Allow-Origin: *`.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Value of `Access-Control-Allow-Origin` on every response.
pub const ALLOW_ORIGIN: &str = "*";
/// Value of `Access-Control-Allow-Methods` on preflight responses.
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
/// Value of `Access-Control-Allow-Headers` on preflight responses.
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Message returned for every accepted submission.
pub const ACCEPTED_MESSAGE: &str = "Feedback submitted successfully";

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct FeedbackAccepted {
    pub success: bool,
    pub message: &'static str,
}

/// JSON response with the CORS origin header attached.
pub fn json_with_cors<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN)],
        Json(body),
    )
        .into_response()
}

/// The success response.
///
/// Genuine submissions and honeypot hits both return exactly this, so a
/// bot cannot tell whether it was dropped.
pub fn feedback_accepted() -> Response {
    json_with_cors(
        StatusCode::OK,
        FeedbackAccepted {
            success: true,
            message: ACCEPTED_MESSAGE,
        },
    )
}

/// Empty 200 answering a CORS preflight.
pub fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
        ],
    )
        .into_response()
}
