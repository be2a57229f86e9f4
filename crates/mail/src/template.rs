//! HTML rendering of feedback notification emails.
//!
//! Every interpolated value passes through [`escape_html`], including the
//! client identifier, which comes from a request header.

use chrono::{DateTime, SecondsFormat, Utc};
use zest_core::feedback::ValidFeedback;
use zest_core::html::escape_html;

/// Subject line of every feedback notification.
pub const FEEDBACK_SUBJECT: &str = "New Zest CLI Feedback Report";

const PRE_STYLE: &str =
    "background: #f5f5f5; padding: 15px; border-radius: 5px; overflow-x: auto;";

/// A rendered email ready for a [`crate::Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

/// Render the operator notification for one validated report.
pub fn render_feedback_email(
    feedback: &ValidFeedback,
    client: &str,
    submitted_at: DateTime<Utc>,
) -> EmailMessage {
    let mut html = String::new();

    html.push_str("<h2>New Feedback Report</h2>\n");
    html.push_str(&format!(
        "<p><strong>Submitted from IP:</strong> {}</p>\n",
        escape_html(client)
    ));
    html.push_str(&format!(
        "<p><strong>Model Version:</strong> {}</p>\n",
        escape_html(feedback.model_version_label())
    ));
    html.push_str("<hr />\n");

    push_block(&mut html, "Natural Language Prompt:", &feedback.prompt);
    push_block(&mut html, "Failed Model Output:", &feedback.failed_output);
    if let Some(ref expected) = feedback.expected_output {
        push_block(&mut html, "Expected Model Output:", expected);
    }

    html.push_str("<hr />\n");
    html.push_str(&format!(
        "<p style=\"color: #666; font-size: 12px;\">Submitted at: {}</p>\n",
        submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));

    EmailMessage {
        subject: FEEDBACK_SUBJECT.to_string(),
        html,
    }
}

fn push_block(html: &mut String, heading: &str, body: &str) {
    html.push_str(&format!("<h3>{heading}</h3>\n"));
    html.push_str(&format!(
        "<pre style=\"{PRE_STYLE}\">{}</pre>\n",
        escape_html(body)
    ));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
