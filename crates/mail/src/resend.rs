//! Resend REST API client.
//!
//! [`ResendMailer`] POSTs `{ from, to, subject, html }` as JSON with bearer
//! auth. Any non-2xx answer is a delivery failure; the provider's response
//! body is logged here and carried in [`MailError::Provider`] for the
//! caller's logs, never for its clients.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;
use crate::template::EmailMessage;
use crate::{MailError, Mailer, SentEmail};

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of a provider error body kept for logs.
const MAX_LOGGED_BODY: usize = 1_000;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Sends notification emails through Resend.
pub struct ResendMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl ResendMailer {
    /// Create a mailer with a pre-configured HTTP client.
    pub fn new(config: EmailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        let payload = SendRequest {
            from: &self.config.from_address,
            to: &self.config.to_address,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_LOGGED_BODY {
                let cut = (0..=MAX_LOGGED_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            tracing::error!(status = status.as_u16(), body = %body, "Resend API rejected email");
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx without a parseable body still counts as sent.
        let id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.id);

        tracing::info!(email_id = id.as_deref().unwrap_or("-"), "Feedback email sent");
        Ok(SentEmail { id })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
