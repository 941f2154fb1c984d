// llm-service-rs/src/store.rs
//
// Persistence seam for processed meetings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_handling::Error;
use input_validation::RequestPayload;
use tokio::sync::RwLock;

use crate::extraction::ExtractionResult;

/// Stores a processed meeting and returns its id
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn save(&self, payload: &RequestPayload, results: &ExtractionResult) -> Result<i64, Error>;
}

/// One saved meeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMeeting {
    pub id: i64,
    pub payload: RequestPayload,
    pub results: ExtractionResult,
    pub created_at: DateTime<Utc>,
}

/// Meetings kept by [`InMemoryMeetingStore::new`]
pub const DEFAULT_STORE_CAPACITY: usize = 500;

/// Process-local store. Ids start at 1 and increase monotonically; once
/// `capacity` meetings are held the oldest is evicted on every save.
#[derive(Debug)]
pub struct InMemoryMeetingStore {
    next_id: AtomicI64,
    capacity: usize,
    meetings: RwLock<VecDeque<StoredMeeting>>,
}

impl Default for InMemoryMeetingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            next_id: AtomicI64::new(1),
            capacity,
            meetings: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub async fn get(&self, id: i64) -> Option<StoredMeeting> {
        self.meetings
            .read()
            .await
            .iter()
            .find(|meeting| meeting.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.meetings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MeetingStore for InMemoryMeetingStore {
    async fn save(&self, payload: &RequestPayload, results: &ExtractionResult) -> Result<i64, Error> {
        let mut meetings = self.meetings.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        while meetings.len() >= self.capacity {
            meetings.pop_front();
        }
        meetings.push_back(StoredMeeting {
            id,
            payload: payload.clone(),
            results: results.clone(),
            created_at: Utc::now(),
        });
        drop(meetings);

        log::debug!("Stored meeting {} ({} action items)", id, results.action_items.len());
        Ok(id)
    }
}
