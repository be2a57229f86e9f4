//! Request extractors shared by handlers.
//!
//! - [`client_ip::ClientIp`] -- Identifies the submitting client for rate limiting.

pub mod client_ip;
