use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use anyhow::Result;

// ============================================================================
// Event Envelope - Event Metadata
// ============================================================================
//
// Wraps domain events with metadata for persistence and publishing.
// This is GENERIC and works with ANY event type.
//
// ============================================================================

/// Generic Event Envelope - wraps any domain event with metadata
///
/// Type Parameter:
/// - `E`: The domain event type (must implement DomainEvent trait)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: String,
    pub sequence_number: u64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,
    pub correlation_id: Uuid,

    pub timestamp: DateTime<Utc>,

    pub metadata: HashMap<String, String>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    /// Wrap an event; type name and schema version come from the event itself
    pub fn new(
        aggregate_id: impl Into<String>,
        sequence_number: u64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.into(),
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: E::event_version(),
            event_data,
            causation_id: None,
            correlation_id,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Number envelopes consecutively after `current_version`
pub fn wrap_events<E: DomainEvent>(
    aggregate_id: &str,
    current_version: u64,
    events: Vec<E>,
    correlation_id: Uuid,
) -> Vec<EventEnvelope<E>> {
    events
        .into_iter()
        .zip(current_version + 1..)
        .map(|(event, seq)| EventEnvelope::new(aggregate_id, seq, event, correlation_id))
        .collect()
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Generic Domain Event trait
///
/// All domain events must implement this trait to be used with the event store.
pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    /// Name of the concrete variant, e.g. `"UserCreated"`
    fn event_type(&self) -> &'static str;

    fn event_version() -> i32 where Self: Sized { 1 }
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_event<E: for<'de> Deserialize<'de>>(json: &str) -> Result<E> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Tests
// ============================================================================
