//! Email provider configuration.

use std::fmt;

/// Default Resend endpoint for sending a single email.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Errors raised while loading [`EmailConfig`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Credentials and addresses for the transactional email provider.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// Bearer token for the provider API.
    pub api_key: String,
    /// Endpoint that accepts `{ from, to, subject, html }`.
    pub api_url: String,
    /// Sender, e.g. `Zest Feedback <feedback@zestcli.com>`.
    pub from_address: String,
    /// Operator inbox receiving reports.
    pub to_address: String,
}

impl EmailConfig {
    /// Load configuration from the process environment.
    ///
    /// | Variable         | Required | Default                          |
    /// |------------------|----------|----------------------------------|
    /// | `RESEND_API_KEY` | yes      | --                               |
    /// | `FROM_EMAIL`     | yes      | --                               |
    /// | `TO_EMAIL`       | yes      | --                               |
    /// | `RESEND_API_URL` | no       | `https://api.resend.com/emails`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            get(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let api_key = required("RESEND_API_KEY")?;
        let from_address = required("FROM_EMAIL")?;
        let to_address = required("TO_EMAIL")?;
        let api_url = get("RESEND_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string());

        check_address("FROM_EMAIL", &from_address)?;
        check_address("TO_EMAIL", &to_address)?;
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                var: "RESEND_API_URL",
                reason: format!("'{api_url}' is not an http(s) URL"),
            });
        }

        Ok(Self {
            api_key,
            api_url,
            from_address,
            to_address,
        })
    }
}

fn check_address(var: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains('@') {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            var,
            reason: format!("'{value}' is not an email address"),
        })
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
