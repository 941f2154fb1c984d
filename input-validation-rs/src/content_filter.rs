//! Restricted-topic keyword filter.
//!
//! The dashboard must not be used to process clinical information, so notes
//! are rejected when they mention any of the terms below. Matching is a plain
//! case-insensitive substring search with no semantic disambiguation: "the
//! patient investor" is rejected just like a real case note. That trade-off is
//! a product decision and is kept as is here.

use crate::errors::{ValidationError, ValidationResult};

/// Terms that mark notes as clinical content. All lowercase.
pub const RESTRICTED_TERMS: &[&str] = &[
    "patient",
    "diagnosis",
    "diagnosed",
    "prescription",
    "medication",
    "symptom",
    "treatment plan",
    "medical record",
    "medical history",
    "clinical",
    "dosage",
    "lab result",
    "blood pressure",
    "icd-10",
];

/// Returns every restricted term occurring in `text`, in list order.
pub fn find_restricted_terms(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    RESTRICTED_TERMS
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}

/// Rejects text that contains any restricted term.
pub fn check_content(text: &str) -> ValidationResult<()> {
    let matched = find_restricted_terms(text);
    if matched.is_empty() {
        return Ok(());
    }

    log::warn!("Content filter rejected notes (matched {} restricted terms)", matched.len());
    Err(ValidationError::RestrictedContent(
        matched.into_iter().map(str::to_string).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinical_notes_rejected() {
        let notes = "Reviewed the patient chart; diagnosis confirmed and follow-up booked for next week.";
        let err = check_content(notes).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RestrictedContent(vec!["patient".to_string(), "diagnosis".to_string()])
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(find_restricted_terms("New MEDICATION formulary rollout"), vec!["medication"]);
    }

    #[test]
    fn test_business_language_false_positive_is_kept() {
        // Known false positive of the substring filter.
        let notes = "The patient investor agreed to extend the bridge round by two quarters.";
        assert!(check_content(notes).is_err());
    }

    #[test]
    fn test_substring_inside_longer_word() {
        assert_eq!(find_restricted_terms("Outpatient billing backlog"), vec!["patient"]);
    }

    #[test]
    fn test_plain_notes_pass() {
        let notes = "Claims backlog is down 12%. Alice owns the payer escalation; Bob drafts the Q3 report.";
        assert!(check_content(notes).is_ok());
    }
}
