//! Request payload for `POST /process`.
//!
//! Validation works on the raw JSON value rather than on a deserialized
//! struct so that a wrong type gets its own message instead of a generic
//! serde error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content_filter::check_content;
use crate::errors::{ValidationError, ValidationResult};
use crate::validators::{is_iso_date, not_blank, notes_length};

const REQUIRED_FIELDS: [&str; 3] = ["title", "date", "notes"];

/// A request that passed every check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<String>,
    pub notes: String,
}

/// Validates a request body and returns the typed payload.
///
/// Checks run in a fixed order and the first failure is reported: required
/// fields, title, date, notes type and length, participants, then the
/// content filter.
pub fn validate_request(body: &Value) -> Result<RequestPayload, error_handling::Error> {
    validate_payload(body).map_err(Into::into)
}

fn validate_payload(body: &Value) -> ValidationResult<RequestPayload> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|field| is_missing(obj, field)) {
        return Err(ValidationError::MissingFields(*missing));
    }

    let title = text_field(obj, "title")?;
    if !not_blank(title) {
        return Err(ValidationError::EmptyTitle);
    }

    let date = text_field(obj, "date")?;
    if !is_iso_date(date) {
        return Err(ValidationError::InvalidDate);
    }

    let notes = text_field(obj, "notes")?;
    notes_length(notes)?;

    let participants = match obj.get("participants") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ValidationError::InvalidType("participants")),
    };

    check_content(notes)?;

    Ok(RequestPayload {
        title: title.trim().to_string(),
        date: date.to_string(),
        participants,
        notes: notes.to_string(),
    })
}

// Absent, null and "" all count as missing.
fn is_missing(obj: &Map<String, Value>, field: &str) -> bool {
    match obj.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn text_field<'a>(obj: &'a Map<String, Value>, field: &'static str) -> ValidationResult<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or(ValidationError::InvalidType(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_handling::ErrorKind;
    use serde_json::json;
    use test_case::test_case;

    const PLAIN_NOTES: &str =
        "Discussed the claims backlog. Alice will triage the denied claims by Friday.";

    fn body(title: &str, date: &str, notes: &str) -> Value {
        json!({ "title": title, "date": date, "notes": notes })
    }

    #[test]
    fn test_valid_request() {
        let payload = validate_request(&json!({
            "title": "  Standup  ",
            "date": "2025-10-14",
            "participants": "Alice, Bob",
            "notes": PLAIN_NOTES,
        }))
        .unwrap();

        assert_eq!(payload.title, "Standup");
        assert_eq!(payload.date, "2025-10-14");
        assert_eq!(payload.participants.as_deref(), Some("Alice, Bob"));
        assert_eq!(payload.notes, PLAIN_NOTES);
    }

    #[test_case(json!({ "date": "2025-10-14", "notes": PLAIN_NOTES }), "title" ; "title absent")]
    #[test_case(json!({ "title": "Standup", "date": null, "notes": PLAIN_NOTES }), "date" ; "date null")]
    #[test_case(json!({ "title": "Standup", "date": "2025-10-14", "notes": "" }), "notes" ; "notes empty")]
    #[test_case(json!({}), "title" ; "first missing wins")]
    fn test_missing_fields(input: Value, field: &str) {
        let err = validate_request(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Missing required fields: title, date, and notes are required");
        assert_eq!(err.metadata()["field"], field);
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_request(&json!(["title"])).unwrap_err();
        assert_eq!(err.message(), "Request body must be a JSON object");
    }

    #[test]
    fn test_blank_title() {
        let err = validate_request(&body("   ", "2025-10-14", PLAIN_NOTES)).unwrap_err();
        assert_eq!(err.message(), "Title cannot be empty");
    }

    #[test]
    fn test_non_text_title() {
        let err = validate_request(&json!({ "title": 7, "date": "2025-10-14", "notes": PLAIN_NOTES })).unwrap_err();
        assert_eq!(err.metadata()["field"], "title");
    }

    #[test_case("2025-10-14", true)]
    #[test_case("10/14/2025", false)]
    #[test_case("2025-13-45", true)]
    #[test_case("２０２５-１０-１４", false ; "fullwidth digits")]
    #[test_case("٢٠٢٥-١٠-١٤", false ; "arabic indic digits")]
    fn test_date_format(date: &str, ok: bool) {
        let result = validate_request(&body("Standup", date, PLAIN_NOTES));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.message(), "Date must be in YYYY-MM-DD format");
        }
    }

    #[test_case(49, false)]
    #[test_case(50, true)]
    #[test_case(100_000, true)]
    #[test_case(100_001, false)]
    fn test_notes_length(len: usize, ok: bool) {
        let notes = "x".repeat(len);
        let result = validate_request(&body("Standup", "2025-10-14", &notes));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_notes_must_be_text() {
        let err = validate_request(&json!({ "title": "Standup", "date": "2025-10-14", "notes": 12345 })).unwrap_err();
        assert_eq!(err.message(), "Field 'notes' must be text");
    }

    #[test]
    fn test_participants_must_be_text() {
        let mut input = body("Standup", "2025-10-14", PLAIN_NOTES);
        input["participants"] = json!(["Alice", "Bob"]);
        let err = validate_request(&input).unwrap_err();
        assert_eq!(err.metadata()["field"], "participants");

        input["participants"] = Value::Null;
        assert!(validate_request(&input).unwrap().participants.is_none());
    }

    #[test]
    fn test_clinical_notes_rejected() {
        let notes = "The patient reported chest pain and the diagnosis was confirmed by the attending team.";
        let err = validate_request(&body("Case review", "2025-10-14", notes)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("patient"));
        assert!(err.message().contains("diagnosis"));
    }

    #[test]
    fn test_length_checked_before_content() {
        let err = validate_request(&body("Standup", "2025-10-14", "patient")).unwrap_err();
        assert!(err.message().starts_with("Notes must be at least 50 characters"));
    }
}
