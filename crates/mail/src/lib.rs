//! Outbound notification email for the feedback relay.
//!
//! - [`EmailConfig`] -- provider credentials and addresses, loaded once at startup.
//! - [`template`] -- renders a validated report into an HTML email.
//! - [`Mailer`] -- the delivery seam; [`ResendMailer`] is the production
//!   implementation talking to the Resend REST API.

pub mod config;
pub mod resend;
pub mod template;

use async_trait::async_trait;

pub use config::{ConfigError, EmailConfig};
pub use resend::ResendMailer;
pub use template::{render_feedback_email, EmailMessage};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
///
/// The display text may contain provider detail and is meant for logs only.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The HTTP request failed (network, DNS, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Email provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Receipt for a message the provider accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentEmail {
    /// Provider-assigned message id, when the provider returns one.
    pub id: Option<String>,
}

/// Delivers rendered notification emails to the operator's inbox.
///
/// Sender and recipient are fixed by the implementation's configuration.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError>;
}
