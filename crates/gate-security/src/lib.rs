//! Sensitive-data redaction for logs and error responses
//!
//! This crate provides:
//! - The built-in rule table (passwords, tokens, keys, card numbers, URIs, ...)
//! - Key-based placeholder classification
//! - A fail-open [`Redactor`] safe to share across request handlers

pub mod error;
pub mod patterns;
pub mod redactor;

pub use error::{RedactError, Result};
pub use patterns::{Placeholder, ValueExtent, classify};
pub use redactor::{MIXED_DATA_PREFIX, Redactor, redact};
