use anyhow::{bail, Result};

use super::error::ClassifiedError;
use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern - Event Sourcing Core
// ============================================================================
//
// Key Principles:
// 1. Validation never mutates; it only computes the events to emit
// 2. State changes flow exclusively through applied events
// 3. Every applied event advances the version by exactly one
// 4. Rejections are values, never panics
//
// This is the GENERIC aggregate trait that works for ANY domain aggregate.
//
// ============================================================================

/// Successful validation: the ordered events a command produced.
///
/// The list may be empty (e.g. validating an absent command). Events must be
/// applied in the order they appear here.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome<E> {
    events: Vec<E>,
}

impl<E> ValidationOutcome<E> {
    pub fn new(events: Vec<E>) -> Self {
        Self { events }
    }

    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn into_events(self) -> Vec<E> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Generic Aggregate trait - all event-sourced aggregates implement this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: Business rule violations and internal faults, classified
/// - `State`: The read-only snapshot handed to query collaborators
pub trait Aggregate: Sized + Send + Sync {
    type Event;
    type Command;
    type Error: ClassifiedError;
    type State;

    /// Aggregate type name used in logs and store bookkeeping
    fn aggregate_type() -> &'static str;

    /// Fresh aggregate carrying only its identity, at version 0
    fn new(id: impl Into<String>) -> Self;

    /// Rebuild from a materialized snapshot without replaying history
    fn rehydrate(state: Self::State) -> Self;

    /// Handle command and emit events (business logic, no mutation)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Fold one event into state and advance the version
    ///
    /// Any error returned here is an internal fault: events produced by
    /// `validate` on the same aggregate must always apply.
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    fn aggregate_id(&self) -> &str;

    /// Current version (number of applied events, or the rehydrated version)
    fn version(&self) -> u64;

    /// Owned snapshot of the current state
    fn state(&self) -> Self::State;

    /// Validate an optional command against current state
    ///
    /// An absent command is always accepted and produces no events.
    fn validate(
        &self,
        command: Option<&Self::Command>,
    ) -> Result<ValidationOutcome<Self::Event>, Self::Error> {
        match command {
            None => Ok(ValidationOutcome::empty()),
            Some(command) => self.handle_command(command).map(ValidationOutcome::new),
        }
    }

    /// Apply every event of a validation outcome, in order
    fn apply_outcome(&mut self, outcome: &ValidationOutcome<Self::Event>) -> Result<(), Self::Error> {
        for event in outcome.events() {
            self.apply_event(event)?;
        }
        Ok(())
    }

    /// Load aggregate from event history (reconstruct from events)
    ///
    /// Envelopes must continue the aggregate version without gaps.
    fn load_from_events(id: impl Into<String>, events: Vec<EventEnvelope<Self::Event>>) -> Result<Self> {
        let mut aggregate = Self::new(id);
        aggregate.replay(events)?;
        Ok(aggregate)
    }

    /// Apply stored envelopes on top of the current state
    fn replay(&mut self, events: Vec<EventEnvelope<Self::Event>>) -> Result<()> {
        for envelope in events {
            let expected = self.version() + 1;
            if envelope.sequence_number != expected {
                bail!(
                    "Sequence gap for {} {}: expected {}, got {}",
                    Self::aggregate_type(),
                    self.aggregate_id(),
                    expected,
                    envelope.sequence_number
                );
            }
            self.apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event: {}", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome() {
        let outcome: ValidationOutcome<u8> = ValidationOutcome::empty();
        assert!(outcome.is_empty());
        assert_eq!(outcome.len(), 0);
        assert!(outcome.into_events().is_empty());
    }

    #[test]
    fn test_outcome_preserves_order() {
        let outcome = ValidationOutcome::new(vec![3, 1, 2]);
        assert_eq!(outcome.events(), &[3, 1, 2]);
        assert_eq!(outcome.clone(), outcome);
    }
}
