//! Error handling for the validation library
//!
//! Field-level validation failures. Each one converts into a taxonomy
//! `Validation` error whose message is written for the end user.

use error_handling::Error;
use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Enum representing the ways a request can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Body is not a JSON object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// One of the required fields is absent, null or empty. Carries the
    /// first missing field.
    #[error("Missing required fields: title, date, and notes are required")]
    MissingFields(&'static str),

    /// Field is present but not a string
    #[error("Field '{0}' must be text")]
    InvalidType(&'static str),

    /// Title is whitespace only
    #[error("Title cannot be empty")]
    EmptyTitle,

    /// Date does not look like YYYY-MM-DD
    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate,

    /// Notes shorter than the minimum
    #[error("Notes must be at least {min} characters long (got {actual})")]
    NotesTooShort { min: usize, actual: usize },

    /// Notes longer than the maximum
    #[error("Notes must not exceed 100,000 characters (got {actual})")]
    NotesTooLong { actual: usize },

    /// Notes mention restricted clinical topics
    #[error(
        "Notes appear to contain restricted clinical content ({}). Please remove medical details and try again.",
        .0.join(", ")
    )]
    RestrictedContent(Vec<String>),
}

impl ValidationError {
    /// Name of the offending field, if the failure is tied to one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingFields(field) | ValidationError::InvalidType(field) => Some(*field),
            ValidationError::EmptyTitle => Some("title"),
            ValidationError::InvalidDate => Some("date"),
            ValidationError::NotesTooShort { .. }
            | ValidationError::NotesTooLong { .. }
            | ValidationError::RestrictedContent(_) => Some("notes"),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        let mut error = Error::validation(err.to_string());
        if let Some(field) = err.field() {
            error = error.with_metadata("field", field);
        }
        if let ValidationError::RestrictedContent(terms) = &err {
            error = error.with_metadata("matchedTerms", terms);
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_handling::ErrorKind;

    #[test]
    fn test_conversion_to_taxonomy() {
        let err: Error = ValidationError::InvalidDate.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Date must be in YYYY-MM-DD format");
        assert_eq!(err.metadata()["field"], "date");
    }

    #[test]
    fn test_restricted_content_lists_terms() {
        let err: Error = ValidationError::RestrictedContent(vec!["patient".into(), "diagnosis".into()]).into();
        assert!(err.message().contains("patient, diagnosis"));
        assert_eq!(err.metadata()["matchedTerms"][1], "diagnosis");
    }

    #[test]
    fn test_not_an_object_has_no_field() {
        let err: Error = ValidationError::NotAnObject.into();
        assert!(err.metadata().is_empty());
    }
}
