// llm-service-rs/src/lib.rs
//
// Completion orchestration for meeting notes extraction.
//
// A validated request is turned into a chat completion request, sent to an
// OpenAI-compatible service, and the returned JSON is checked and decoded
// into an ExtractionResult before being stored and wrapped in the success
// envelope. Every failure along the way comes back as an
// error_handling::Error.

pub mod extraction;
pub mod llm_client;
pub mod processor;
pub mod prompt;
pub mod store;

pub use extraction::{parse_extraction, ActionItem, Blocker, Decision, ExtractionResult, Priority};
pub use llm_client::{Completion, CompletionRequest, CompletionService, OpenAiCompletionClient};
pub use processor::{MeetingProcessor, ProcessResponse, ProcessingMetadata};
pub use store::{InMemoryMeetingStore, MeetingStore, StoredMeeting, DEFAULT_STORE_CAPACITY};
