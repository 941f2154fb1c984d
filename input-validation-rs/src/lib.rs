//! # Input Validation Library
//!
//! Validation of inbound meeting-notes requests. Everything here runs before
//! the completion service is contacted: a payload that fails any check is
//! rejected with a `VALIDATION_ERROR` and never reaches the orchestrator.
//!
//! ## Features
//!
//! - Required-field, type, format and length checks on the request body
//! - A restricted-topic keyword filter over the notes text
//! - Field-level errors that convert into the service-wide error taxonomy

mod errors;
pub mod content_filter;
pub mod payload;
pub mod validators;

pub use content_filter::{find_restricted_terms, RESTRICTED_TERMS};
pub use errors::{ValidationError, ValidationResult};
pub use payload::{validate_request, RequestPayload};

/// Minimum length of the notes text, in characters
pub const MIN_NOTES_CHARS: usize = 50;

/// Maximum length of the notes text, in characters
pub const MAX_NOTES_CHARS: usize = 100_000;
