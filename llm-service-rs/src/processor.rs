// llm-service-rs/src/processor.rs
//
// Completion orchestration and response assembly.
//
// MeetingProcessor runs one validated request through the pipeline:
// instruction template -> completion call (bounded by the configured
// timeout) -> structural validation -> store -> success envelope.
// Completion failures go through the external error translator; everything
// else is already an error_handling::Error by the time it gets here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use error_handling::{translate, Error, ExternalError};
use input_validation::RequestPayload;
use serde::Serialize;
use tracing::instrument;

use crate::extraction::{parse_extraction, ExtractionResult};
use crate::llm_client::{Completion, CompletionRequest, CompletionService};
use crate::prompt::build_request;
use crate::store::MeetingStore;

/// Body of a successful `POST /process` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub meeting_id: i64,
    pub results: ExtractionResult,
    pub metadata: ProcessingMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingMetadata {
    pub model: String,
    pub tokens_used: u32,
    /// RFC 3339 timestamp of when processing finished
    pub processing_time: String,
}

impl ProcessResponse {
    pub fn new(meeting_id: i64, results: ExtractionResult, metadata: ProcessingMetadata) -> Self {
        Self {
            success: true,
            meeting_id,
            results,
            metadata,
        }
    }
}

/// Runs validated requests through the completion service
pub struct MeetingProcessor {
    completion: Arc<dyn CompletionService>,
    store: Arc<dyn MeetingStore>,
    timeout: Duration,
}

impl MeetingProcessor {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn MeetingStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            completion,
            store,
            timeout,
        }
    }

    /// Processes one request. No retry is attempted on any failure.
    #[instrument(
        name = "process_meeting",
        skip(self, payload),
        fields(meeting.date = %payload.date, notes.chars = payload.notes.chars().count())
    )]
    pub async fn process(&self, payload: &RequestPayload) -> Result<ProcessResponse, Error> {
        let started = Instant::now();

        let request = build_request(payload);
        let completion = self.complete(&request).await?;
        let results = parse_extraction(&completion.content)?;
        let meeting_id = self.store.save(payload, &results).await?;

        tracing::info!(
            meeting_id,
            action_items = results.action_items.len(),
            decisions = results.decisions.len(),
            blockers = results.blockers.len(),
            tokens_used = completion.total_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Meeting notes processed"
        );

        Ok(ProcessResponse::new(
            meeting_id,
            results,
            ProcessingMetadata {
                model: completion.model,
                tokens_used: completion.total_tokens,
                processing_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        ))
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, Error> {
        let outcome = match tokio::time::timeout(self.timeout, self.completion.complete(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExternalError::timeout(format!(
                "No completion within {}ms",
                self.timeout.as_millis()
            ))),
        };

        outcome.map_err(|external| {
            tracing::warn!(
                status = ?external.status,
                code = ?external.code,
                timed_out = external.timed_out,
                "Completion service call failed"
            );
            translate(&external)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMeetingStore;
    use async_trait::async_trait;
    use error_handling::ErrorKind;
    use serde_json::json;
    use std::sync::Mutex;

    /// Completion service returning a canned outcome
    struct MockCompletion {
        outcome: Result<Completion, ExternalError>,
        delay: Duration,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockCompletion {
        fn replying(content: &str) -> Self {
            Self {
                outcome: Ok(Completion {
                    content: content.to_string(),
                    model: "gpt-4o-mini".to_string(),
                    total_tokens: 412,
                }),
                delay: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: ExternalError) -> Self {
            Self {
                outcome: Err(err),
                delay: Duration::ZERO,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for MockCompletion {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExternalError> {
            self.requests.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    struct FailingStore;

    #[async_trait]
    impl MeetingStore for FailingStore {
        async fn save(&self, _: &RequestPayload, _: &ExtractionResult) -> Result<i64, Error> {
            Err(Error::internal_server("Failed to save meeting"))
        }
    }

    const EXTRACTION: &str = r#"{
        "action_items": [{ "task": "Send the denial report", "owner": "Alice", "due_date": "2025-10-17", "priority": "high" }],
        "decisions": [],
        "blockers": [{ "description": "Waiting on payer API access", "impact": "Delays automation", "owner": "Bob" }]
    }"#;

    fn payload() -> RequestPayload {
        RequestPayload {
            title: "Claims sync".to_string(),
            date: "2025-10-14".to_string(),
            participants: Some("Alice, Bob".to_string()),
            notes: "Alice will send the denial report by Friday. Bob is blocked on payer API access.".to_string(),
        }
    }

    fn processor(completion: Arc<MockCompletion>, store: Arc<dyn MeetingStore>) -> MeetingProcessor {
        MeetingProcessor::new(completion, store, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_successful_processing() {
        let completion = Arc::new(MockCompletion::replying(EXTRACTION));
        let store = Arc::new(InMemoryMeetingStore::new());
        let response = processor(completion.clone(), store.clone())
            .process(&payload())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.meeting_id, 1);
        assert_eq!(response.results.action_items[0].owner.as_deref(), Some("Alice"));
        assert_eq!(response.results.blockers.len(), 1);
        assert_eq!(response.metadata.model, "gpt-4o-mini");
        assert_eq!(response.metadata.tokens_used, 412);
        assert!(chrono::DateTime::parse_from_rfc3339(&response.metadata.processing_time).is_ok());

        let stored = store.get(1).await.unwrap();
        assert_eq!(stored.results, response.results);

        let requests = completion.requests.lock().unwrap();
        assert!(requests[0].user_prompt.contains("Claims sync"));
    }

    #[tokio::test]
    async fn test_success_envelope_shape() {
        let completion = Arc::new(MockCompletion::replying(EXTRACTION));
        let response = processor(completion, Arc::new(InMemoryMeetingStore::new()))
            .process(&payload())
            .await
            .unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["meeting_id"], 1);
        assert_eq!(json["results"]["action_items"][0]["priority"], "high");
        assert_eq!(json["results"]["decisions"], json!([]));
        assert_eq!(json["metadata"]["tokens_used"], 412);
    }

    #[tokio::test]
    async fn test_rate_limit_is_translated_without_retry() {
        let completion = Arc::new(MockCompletion::failing(
            ExternalError::new("Rate limit reached")
                .with_status(429)
                .with_code("rate_limit_exceeded")
                .with_retry_after("20"),
        ));
        let store = Arc::new(InMemoryMeetingStore::new());
        let err = processor(completion.clone(), store.clone())
            .process(&payload())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.metadata()["retryAfter"], "20");
        assert_eq!(completion.calls(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_key_hidden_from_caller() {
        let completion = Arc::new(MockCompletion::failing(
            ExternalError::new("Incorrect API key provided: sk-abc***").with_status(401),
        ));
        let err = processor(completion, Arc::new(InMemoryMeetingStore::new()))
            .process(&payload())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InternalServer);
        assert!(!err.message().contains("sk-"));
        assert!(err.metadata().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_becomes_service_unavailable() {
        let mut mock = MockCompletion::replying(EXTRACTION);
        mock.delay = Duration::from_millis(200);
        let processor = MeetingProcessor::new(
            Arc::new(mock),
            Arc::new(InMemoryMeetingStore::new()),
            Duration::from_millis(20),
        );

        let err = processor.process(&payload()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(err.metadata()["timeout"], true);
    }

    #[tokio::test]
    async fn test_incomplete_output_is_internal_error() {
        let completion = Arc::new(MockCompletion::replying(r#"{"action_items": [], "decisions": []}"#));
        let store = Arc::new(InMemoryMeetingStore::new());
        let err = processor(completion, store.clone())
            .process(&payload())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InternalServer);
        assert!(err.message().contains("try again"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let completion = Arc::new(MockCompletion::replying(EXTRACTION));
        let err = processor(completion, Arc::new(FailingStore))
            .process(&payload())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InternalServer);
        assert_eq!(err.message(), "Failed to save meeting");
    }
}
