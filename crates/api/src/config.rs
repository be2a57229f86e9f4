use axum::http::HeaderName;
use zest_core::rate_limit::{
    RateLimitPolicy, DEFAULT_BLOCK_SECS, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS,
};

/// Header carrying the client address when running behind Cloudflare.
pub const DEFAULT_CLIENT_IP_HEADER: &str = "cf-connecting-ip";

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Where rate-limit counters live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process map; per-instance counters.
    Memory,
    /// Shared Redis at the given URL.
    Redis(String),
    /// No store: every request is allowed.
    Disabled,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8787`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Request header holding the client address.
    pub client_ip_header: HeaderName,
    /// Submission limits applied per client.
    pub rate_limit: RateLimitPolicy,
    /// Counter store selection.
    pub store: StoreBackend,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                 |
    /// | `PORT`                   | `8787`                                    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                      |
    /// | `CLIENT_IP_HEADER`       | `CF-Connecting-IP`                        |
    /// | `RATE_LIMIT_MAX`         | `1`                                       |
    /// | `RATE_LIMIT_WINDOW_SECS` | `60`                                      |
    /// | `RATE_LIMIT_BLOCK_SECS`  | `60`                                      |
    /// | `RATE_LIMIT_STORE`       | `redis` if `REDIS_URL` is set, else `memory` |
    /// | `REDIS_URL`              | --                                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(var("PORT"), "PORT", 8787)?;
        let request_timeout_secs: u64 =
            parse_or(var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 30)?;

        let header = var("CLIENT_IP_HEADER").unwrap_or_else(|| DEFAULT_CLIENT_IP_HEADER.into());
        let client_ip_header =
            HeaderName::try_from(header.as_str()).map_err(|e| ConfigError::Invalid {
                var: "CLIENT_IP_HEADER",
                reason: e.to_string(),
            })?;

        let rate_limit = RateLimitPolicy {
            max_requests: parse_positive(
                var("RATE_LIMIT_MAX"),
                "RATE_LIMIT_MAX",
                DEFAULT_MAX_REQUESTS,
            )?,
            window_secs: parse_positive(
                var("RATE_LIMIT_WINDOW_SECS"),
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_WINDOW_SECS,
            )?,
            block_secs: parse_positive(
                var("RATE_LIMIT_BLOCK_SECS"),
                "RATE_LIMIT_BLOCK_SECS",
                DEFAULT_BLOCK_SECS,
            )?,
        };

        let redis_url = var("REDIS_URL");
        let store = match var("RATE_LIMIT_STORE").map(|s| s.to_ascii_lowercase()).as_deref() {
            None => match redis_url {
                Some(url) => StoreBackend::Redis(url),
                None => StoreBackend::Memory,
            },
            Some("memory") => StoreBackend::Memory,
            Some("redis") => {
                StoreBackend::Redis(redis_url.ok_or(ConfigError::Missing("REDIS_URL"))?)
            }
            Some("disabled") => StoreBackend::Disabled,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "RATE_LIMIT_STORE",
                    reason: format!("'{other}' is not one of memory, redis, disabled"),
                })
            }
        };

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            client_ip_header,
            rate_limit,
            store,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}

fn parse_positive<T>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let parsed = parse_or(value, var, default)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
