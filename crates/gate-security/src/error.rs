//! Error types for gate-security

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedactError>;

/// Internal redaction failures. These never leave [`crate::Redactor::redact`],
/// which falls back to the unmodified input.
#[derive(Error, Debug)]
pub enum RedactError {
    #[error("Invalid redaction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Redaction panicked")]
    Panicked,
}
