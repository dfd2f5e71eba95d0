use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};

// ============================================================================
// Generic Event Store - Repository for Events
// ============================================================================
//
// Responsibilities:
// 1. Append events to a per-aggregate stream (append-only)
// 2. Load event history for aggregates, optionally after a snapshot version
// 3. Enforce optimistic concurrency on every append
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrency conflict on {aggregate_id}: expected version {expected}, but current is {actual}")]
    ConcurrencyConflict {
        aggregate_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Cannot append empty event list")]
    EmptyAppend,

    #[error("Event for {aggregate_id} has sequence number {actual}, expected {expected}")]
    SequenceMismatch {
        aggregate_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Another writer got there first; reloading and retrying may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

#[async_trait]
pub trait EventStore<E: DomainEvent + 'static>: Send + Sync {
    /// Append events, returning the new stream version
    ///
    /// Fails with `ConcurrencyConflict` when the stream has moved past
    /// `expected_version`.
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<u64, StoreError>;

    /// Events with sequence numbers strictly greater than `version`, in order
    async fn load_events_after(
        &self,
        aggregate_id: &str,
        version: u64,
    ) -> Result<Vec<EventEnvelope<E>>, StoreError>;

    async fn current_version(&self, aggregate_id: &str) -> Result<u64, StoreError>;

    /// Load all events for an aggregate
    async fn load_events(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope<E>>, StoreError> {
        self.load_events_after(aggregate_id, 0).await
    }

    async fn aggregate_exists(&self, aggregate_id: &str) -> Result<bool, StoreError> {
        Ok(self.current_version(aggregate_id).await? > 0)
    }
}

/// Row as held by the in-memory store; the payload is JSON like a real table column
#[derive(Debug, Clone)]
struct StoredEvent {
    event_id: Uuid,
    sequence_number: u64,
    event_type: String,
    event_version: i32,
    payload: String,
    causation_id: Option<Uuid>,
    correlation_id: Uuid,
    timestamp: DateTime<Utc>,
    metadata: HashMap<String, String>,
}

pub struct InMemoryEventStore<E> {
    aggregate_type_name: String, // e.g., "User"
    streams: RwLock<HashMap<String, Vec<StoredEvent>>>,
    _phantom: PhantomData<fn() -> E>,
}

impl<E: DomainEvent> InMemoryEventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            aggregate_type_name: aggregate_type_name.to_string(),
            streams: RwLock::new(HashMap::new()),
            _phantom: PhantomData,
        }
    }

    fn decode(aggregate_id: &str, row: &StoredEvent) -> Result<EventEnvelope<E>, StoreError> {
        let event_data: E = serde_json::from_str(&row.payload)?;
        Ok(EventEnvelope {
            event_id: row.event_id,
            aggregate_id: aggregate_id.to_string(),
            sequence_number: row.sequence_number,
            event_type: row.event_type.clone(),
            event_version: row.event_version,
            event_data,
            causation_id: row.causation_id,
            correlation_id: row.correlation_id,
            timestamp: row.timestamp,
            metadata: row.metadata.clone(),
        })
    }
}

#[async_trait]
impl<E: DomainEvent + 'static> EventStore<E> for InMemoryEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<u64, StoreError> {
        if events.is_empty() {
            return Err(StoreError::EmptyAppend);
        }

        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id.to_string()).or_default();

        // Check optimistic concurrency
        let current_version = stream.last().map_or(0, |row| row.sequence_number);
        if current_version != expected_version {
            return Err(StoreError::ConcurrencyConflict {
                aggregate_id: aggregate_id.to_string(),
                expected: expected_version,
                actual: current_version,
            });
        }

        // Serialize the whole batch before touching the stream so a failure leaves it intact
        let mut rows = Vec::with_capacity(events.len());
        let mut new_version = expected_version;
        for envelope in &events {
            new_version += 1;
            if envelope.sequence_number != new_version {
                return Err(StoreError::SequenceMismatch {
                    aggregate_id: aggregate_id.to_string(),
                    expected: new_version,
                    actual: envelope.sequence_number,
                });
            }
            rows.push(StoredEvent {
                event_id: envelope.event_id,
                sequence_number: envelope.sequence_number,
                event_type: envelope.event_type.clone(),
                event_version: envelope.event_version,
                payload: serde_json::to_string(&envelope.event_data)?,
                causation_id: envelope.causation_id,
                correlation_id: envelope.correlation_id,
                timestamp: envelope.timestamp,
                metadata: envelope.metadata.clone(),
            });
        }

        stream.extend(rows);

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            event_count = events.len(),
            "Appended events to event store"
        );

        Ok(new_version)
    }

    async fn load_events_after(
        &self,
        aggregate_id: &str,
        version: u64,
    ) -> Result<Vec<EventEnvelope<E>>, StoreError> {
        let streams = self.streams.read().await;

        let events = match streams.get(aggregate_id) {
            Some(stream) => stream
                .iter()
                .filter(|row| row.sequence_number > version)
                .map(|row| Self::decode(aggregate_id, row))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        tracing::debug!(
            aggregate_id = %aggregate_id,
            after_version = version,
            count = events.len(),
            "Loaded events"
        );
        Ok(events)
    }

    async fn current_version(&self, aggregate_id: &str) -> Result<u64, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |row| row.sequence_number))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Noted {
        text: String,
    }

    impl DomainEvent for Noted {
        fn event_type(&self) -> &'static str {
            "Noted"
        }
    }

    fn note(text: &str) -> Noted {
        Noted { text: text.to_string() }
    }

    fn envelope(seq: u64, text: &str) -> EventEnvelope<Noted> {
        EventEnvelope::new("agg-1", seq, note(text), Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_append_and_load() {
        let store = InMemoryEventStore::<Noted>::new("Note");

        let version = store
            .append_events("agg-1", 0, vec![envelope(1, "a"), envelope(2, "b")])
            .await
            .unwrap();
        assert_eq!(version, 2);

        let events = store.load_events("agg-1").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_data, note("a"));
        assert_eq!(events[1].sequence_number, 2);
        assert_eq!(events[1].event_type, "Noted");
        assert!(store.aggregate_exists("agg-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrency_conflict_detected() {
        let store = InMemoryEventStore::<Noted>::new("Note");
        store.append_events("agg-1", 0, vec![envelope(1, "a")]).await.unwrap();

        let err = store
            .append_events("agg-1", 0, vec![envelope(1, "b")])
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(matches!(
            err,
            StoreError::ConcurrencyConflict { expected: 0, actual: 1, .. }
        ));
        assert_eq!(store.current_version("agg-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_append_rejected() {
        let store = InMemoryEventStore::<Noted>::new("Note");
        let err = store.append_events("agg-1", 0, vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyAppend));
    }

    #[tokio::test]
    async fn test_sequence_gap_rejected() {
        let store = InMemoryEventStore::<Noted>::new("Note");
        let err = store
            .append_events("agg-1", 0, vec![envelope(1, "a"), envelope(3, "b")])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::SequenceMismatch { expected: 2, actual: 3, .. }));
        // Nothing from the rejected batch is visible
        assert_eq!(store.current_version("agg-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_after_version() {
        let store = InMemoryEventStore::<Noted>::new("Note");
        store
            .append_events("agg-1", 0, vec![envelope(1, "a"), envelope(2, "b"), envelope(3, "c")])
            .await
            .unwrap();

        let tail = store.load_events_after("agg-1", 2).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].event_data, note("c"));
    }

    #[tokio::test]
    async fn test_streams_are_isolated() {
        let store = InMemoryEventStore::<Noted>::new("Note");
        store.append_events("agg-1", 0, vec![envelope(1, "a")]).await.unwrap();

        assert_eq!(store.current_version("agg-2").await.unwrap(), 0);
        assert!(store.load_events("agg-2").await.unwrap().is_empty());
        assert!(!store.aggregate_exists("agg-2").await.unwrap());
    }
}
