// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// This module contains GENERIC, reusable event sourcing infrastructure
// that works with ANY domain aggregate.
//
// Key Principles:
// - No domain-specific code (no User, Shortener, etc.)
// - Generic over aggregate types
// - Pure computation, no I/O
//
// ============================================================================

pub mod aggregate;
pub mod error;
pub mod event;

// Re-export core types for convenience
pub use aggregate::{Aggregate, ValidationOutcome};
pub use error::{ClassifiedError, ErrorClass};
pub use event::{DomainEvent, EventEnvelope, serialize_event, deserialize_event, wrap_events};
