//! In-memory event store
//!
//! Keeps the ordered collection in a `Vec` behind a single
//! exclusive-write/shared-read lock. Write volume is low relative to read
//! volume and the sequence is strictly append-only in the hot path, so one
//! coarse lock is the correct discipline — queries and snapshots share read
//! access, appends take the write half briefly.

use async_trait::async_trait;
use pulse_types::{EventFilter, EventPatch, NewEvent, PulseError, Result, StoredEvent};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::backend::EventStore;

/// In-memory `EventStore` implementation.
///
/// Constructed once per process (or once per test) and shared as
/// `Arc<dyn EventStore>`. State does not survive restarts.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<StoredEvent>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with events, preserving their order.
    /// Test and seed convenience.
    pub fn with_events(events: Vec<StoredEvent>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: NewEvent) -> Result<StoredEvent> {
        let stored = StoredEvent::from_new(event);
        let mut events = self.events.write().await;
        events.push(stored.clone());
        debug!(event_id = %stored.id, event_type = %stored.event_type, total = events.len(), "event appended");
        Ok(stored)
    }

    async fn query(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        let events = self.events.read().await;

        // Walk the store newest-appended first so that after the stable sort
        // below, equal timestamps surface in reverse insertion order.
        let mut matched: Vec<StoredEvent> = events
            .iter()
            .rev()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(filter.effective_limit());
        Ok(matched)
    }

    async fn snapshot(&self) -> Result<Vec<StoredEvent>> {
        Ok(self.events.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|event| event.id == id).cloned())
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<StoredEvent> {
        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| PulseError::NotFound(format!("event {id}")))?;
        patch.apply(event);
        Ok(event.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|event| event.id != id);
        Ok(events.len() < before)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.events.read().await.len())
    }
}
