// llm-service-rs/src/extraction.rs
//
// Extraction result model and structural validation of completion output.
//
// The completion service is asked for JSON but nothing guarantees it. The
// text is parsed, the three sections are checked to be present and to be
// arrays, and only then are items decoded. Every failure here is the
// service's fault, not the caller's, so it surfaces as InternalServer with
// the details kept in diagnostics.

use error_handling::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNPARSEABLE_MESSAGE: &str = "Failed to process AI response. Please try again.";
pub const INCOMPLETE_MESSAGE: &str = "AI response was incomplete. Please try again.";

const SECTIONS: [&str; 3] = ["action_items", "decisions", "blockers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// YYYY-MM-DD when the notes give a date
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub description: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

// Models write `null` for fields they have nothing for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Structured content extracted from one set of meeting notes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<Decision>,
    pub blockers: Vec<Blocker>,
}

/// Parses and structurally validates completion text.
pub fn parse_extraction(text: &str) -> Result<ExtractionResult, Error> {
    let body = strip_code_fence(text);

    let value: Value = serde_json::from_str(body).map_err(|err| {
        Error::internal_server(UNPARSEABLE_MESSAGE)
            .with_diagnostic("hint", "completion output was not valid JSON")
            .with_diagnostic("parseError", err.to_string())
            .with_cause(err)
    })?;

    let object = value.as_object().ok_or_else(|| {
        Error::internal_server(INCOMPLETE_MESSAGE)
            .with_diagnostic("hint", "completion output was not a JSON object")
    })?;

    for section in SECTIONS {
        if !object.get(section).map_or(false, Value::is_array) {
            return Err(Error::internal_server(INCOMPLETE_MESSAGE)
                .with_diagnostic("hint", "completion output is missing a required section")
                .with_diagnostic("missingSection", section));
        }
    }

    serde_json::from_value(value).map_err(|err| {
        Error::internal_server(UNPARSEABLE_MESSAGE)
            .with_diagnostic("hint", "completion output contained a malformed item")
            .with_diagnostic("parseError", err.to_string())
            .with_cause(err)
    })
}

// Models sometimes wrap JSON in ```json ... ``` even in JSON mode, on one
// line or several. Only the info string after the opening fence is dropped.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body_start = rest.find(|c: char| c == '{' || c == '[' || c == '\n').unwrap_or(rest.len());
    let rest = &rest[body_start..];
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
