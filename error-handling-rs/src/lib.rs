//! # Error Handling Framework
//!
//! Error handling for the meeting notes extraction service: a closed error
//! taxonomy with tracking ids, the projection of errors onto the public
//! response envelope, translation of completion-service failures into the
//! taxonomy, and structured logging with sanitized diagnostics.
//!
//! ## Features
//!
//! - Eight fixed error kinds, each with its own HTTP status and machine code
//! - Short tracking ids generated at construction time
//! - One-way serialization into the `{ success: false, ... }` envelope
//! - Pure translation of external service failures
//! - Structured logging with redaction of secrets
//!

pub mod types;
pub mod envelope;
pub mod external;
pub mod translate;
pub mod logging;
pub mod sanitization;

// Re-export commonly used types
pub use types::{generate_error_id, Error, ErrorKind, Result, ERROR_ID_LEN};
pub use envelope::ErrorEnvelope;
pub use external::ExternalError;
pub use translate::translate;
pub use logging::{init_logging, log_structured_error, LoggingConfig};
pub use sanitization::sanitize_message;
