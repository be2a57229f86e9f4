/// Domain-level error shared by the relay crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `prompt` and/or `failedOutput` were absent or blank.
    #[error("Missing required fields: prompt and failedOutput")]
    MissingFields,

    #[error("Validation failed: {0}")]
    Validation(String),
}
