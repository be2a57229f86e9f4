//! Client identification for rate limiting.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};

use crate::state::AppState;

/// Identifier used when the proxy did not supply a client address.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Longest identifier accepted from the header; longer values are cut.
const MAX_CLIENT_LEN: usize = 64;

/// Client identifier taken from the reverse-proxy header named by
/// `ServerConfig::client_ip_header`, or [`UNKNOWN_CLIENT`].
///
/// All clients without the header share one rate-limit bucket.
///
/// ```ignore
/// async fn handler(ClientIp(client): ClientIp) {
///     tracing::info!(client, "handling request");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    /// Read the client identifier from `headers`.
    pub fn from_headers(headers: &HeaderMap, header: &HeaderName) -> Self {
        let value = headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match value {
            Some(v) => Self(v.chars().take(MAX_CLIENT_LEN).collect()),
            None => Self(UNKNOWN_CLIENT.to_string()),
        }
    }
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.config.client_ip_header))
    }
}
