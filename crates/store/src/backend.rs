//! Event store trait definition
//!
//! This module defines the `EventStore` trait every storage implementation
//! must satisfy. All operations are async so in-memory and persistent
//! backends share one interface.
//!
//! ## Implementation requirements
//!
//! - **Thread safety**: concurrent `append` and `query` from multiple tasks
//!   must never corrupt the ordered sequence.
//! - **Immediate visibility**: an appended event is visible to every
//!   subsequent query — there is no eventual-consistency window.
//! - **Consistent snapshots**: `snapshot` returns a view no concurrent
//!   append can tear.
//! - **Transient failures**: a backend that can lose its underlying store
//!   reports `PulseError::TransientStore`, which callers may retry.

use async_trait::async_trait;
use pulse_types::{EventFilter, EventPatch, NewEvent, Result, StoredEvent};
use uuid::Uuid;

/// Core trait for event store implementations.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Assign identity and ingestion time to a validated event and store it.
    ///
    /// Returns the stored form. The event is visible to queries as soon as
    /// this call returns.
    async fn append(&self, event: NewEvent) -> Result<StoredEvent>;

    /// Apply the filter's predicates by conjunction, sort by `timestamp`
    /// descending (stable — equal timestamps surface in reverse insertion
    /// order), and truncate to the filter's limit.
    ///
    /// An empty filter returns all events, subject to the default limit.
    async fn query(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>>;

    /// An internally consistent copy of every stored event, in insertion
    /// order. Aggregation runs against this so it never observes a partial
    /// append.
    async fn snapshot(&self) -> Result<Vec<StoredEvent>>;

    /// Look up a single event by id.
    async fn get(&self, id: Uuid) -> Result<Option<StoredEvent>>;

    /// Administrative correction: apply a partial update to an event.
    ///
    /// Returns `PulseError::NotFound` when the id has no match. Not part of
    /// the hot path.
    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<StoredEvent>;

    /// Administrative correction: remove an event. Returns whether an event
    /// was removed. Not part of the hot path.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Number of stored events.
    async fn len(&self) -> Result<usize>;
}
