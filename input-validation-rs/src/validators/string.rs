//! String validators
//!
//! Lengths are counted in characters, not bytes, so notes written in
//! non-Latin scripts get the same limits.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{ValidationError, ValidationResult};
use crate::{MAX_NOTES_CHARS, MIN_NOTES_CHARS};

lazy_static! {
    // Shape only; 2025-13-45 passes. ASCII digits only.
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

/// Validate that a string has something other than whitespace in it
pub fn not_blank(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Validate that a date string looks like YYYY-MM-DD
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE.is_match(s)
}

/// Validate the notes length against the allowed window
pub fn notes_length(notes: &str) -> ValidationResult<()> {
    let actual = notes.chars().count();
    if actual < MIN_NOTES_CHARS {
        Err(ValidationError::NotesTooShort {
            min: MIN_NOTES_CHARS,
            actual,
        })
    } else if actual > MAX_NOTES_CHARS {
        Err(ValidationError::NotesTooLong { actual })
    } else {
        Ok(())
    }
}
