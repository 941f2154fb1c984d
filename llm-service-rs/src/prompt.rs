// llm-service-rs/src/prompt.rs
//
// Instruction template for meeting notes extraction.

use input_validation::RequestPayload;

use crate::llm_client::CompletionRequest;

/// System instructions sent with every extraction request.
///
/// The shape described here is the one `parse_extraction` checks, so the two
/// must change together.
pub const SYSTEM_PROMPT: &str = "You are an assistant that extracts structured information from meeting notes.

Read the meeting notes and return a single JSON object with exactly these keys:

{
  \"action_items\": [
    { \"task\": string, \"owner\": string or null, \"due_date\": \"YYYY-MM-DD\" or null, \"priority\": \"critical\" | \"high\" | \"medium\" | \"low\" }
  ],
  \"decisions\": [
    { \"decision\": string, \"context\": string, \"impact\": string }
  ],
  \"blockers\": [
    { \"description\": string, \"impact\": string, \"owner\": string }
  ]
}

Rules:
1. Always include all three keys; use an empty array when nothing applies
2. Only use information stated in the notes; do not invent owners or dates
3. Resolve relative dates against the meeting date
4. Keep each entry to one or two sentences
5. Return JSON only, with no commentary";

/// Builds the completion request for a validated payload.
pub fn build_request(payload: &RequestPayload) -> CompletionRequest {
    CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: user_prompt(payload),
    }
}

fn user_prompt(payload: &RequestPayload) -> String {
    let participants = payload
        .participants
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Not specified");

    format!(
        "Meeting title: {}\nMeeting date: {}\nParticipants: {}\n\nMeeting notes:\n{}",
        payload.title, payload.date, participants, payload.notes
    )
}
