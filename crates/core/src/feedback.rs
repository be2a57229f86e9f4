//! Inbound feedback submissions.
//!
//! A [`FeedbackSubmission`] is the raw JSON body posted by the "report an
//! issue" form. It is never trusted: [`FeedbackSubmission::is_spam`] checks
//! the honeypot field and [`FeedbackSubmission::validate`] turns it into a
//! [`ValidFeedback`] whose required fields are guaranteed present.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Maximum length of any single text field, in characters.
pub const MAX_FIELD_LENGTH: usize = 10_000;

/// Placeholder rendered when the form did not send a model version.
pub const MODEL_VERSION_UNSPECIFIED: &str = "Not specified";

// ---------------------------------------------------------------------------
// Raw submission
// ---------------------------------------------------------------------------

/// Feedback report as received on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    /// The natural-language request that produced a bad command.
    #[serde(default)]
    pub prompt: Option<String>,
    /// The incorrect command the model produced.
    #[serde(default)]
    pub failed_output: Option<String>,
    /// What the command should have been.
    #[serde(default)]
    pub expected_output: Option<String>,
    /// Product variant label, e.g. `Zest Lite`.
    #[serde(default)]
    pub model_version: Option<String>,
    /// Honeypot. Hidden from humans, so anything here came from a bot.
    /// Any JSON type is accepted so a bot never sees a parse error.
    #[serde(default)]
    pub website: Option<Value>,
}

impl FeedbackSubmission {
    /// Whether the honeypot field was filled in.
    ///
    /// `null`, `false`, `0` and `""` count as empty. Every other value,
    /// including `"0"`, `[]` and `{}`, marks the submission as spam.
    pub fn is_spam(&self) -> bool {
        self.website.as_ref().is_some_and(is_filled)
    }

    /// Check required fields and length limits.
    ///
    /// Missing or blank `prompt`/`failedOutput` yields
    /// [`CoreError::MissingFields`]. Any field longer than
    /// [`MAX_FIELD_LENGTH`] yields [`CoreError::Validation`].
    pub fn validate(self) -> Result<ValidFeedback, CoreError> {
        let prompt = non_blank(self.prompt);
        let failed_output = non_blank(self.failed_output);

        let (Some(prompt), Some(failed_output)) = (prompt, failed_output) else {
            return Err(CoreError::MissingFields);
        };

        let expected_output = self.expected_output.filter(|s| !s.is_empty());
        let model_version = non_blank(self.model_version);

        check_length("prompt", &prompt)?;
        check_length("failedOutput", &failed_output)?;
        if let Some(ref expected) = expected_output {
            check_length("expectedOutput", expected)?;
        }
        if let Some(ref version) = model_version {
            check_length("modelVersion", version)?;
        }

        Ok(ValidFeedback {
            prompt,
            failed_output,
            expected_output,
            model_version,
        })
    }
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn check_length(field: &str, value: &str) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len > MAX_FIELD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Field '{field}' exceeds maximum length of {MAX_FIELD_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validated submission
// ---------------------------------------------------------------------------

/// A submission that passed validation and is ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFeedback {
    pub prompt: String,
    pub failed_output: String,
    pub expected_output: Option<String>,
    pub model_version: Option<String>,
}

impl ValidFeedback {
    /// Model version label, or [`MODEL_VERSION_UNSPECIFIED`].
    pub fn model_version_label(&self) -> &str {
        self.model_version
            .as_deref()
            .unwrap_or(MODEL_VERSION_UNSPECIFIED)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
