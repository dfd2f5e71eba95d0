// ============================================================================
// Event Sourcing Store - Generic Persistence Layer
// ============================================================================
//
// Persistence contracts plus in-memory implementations. Real storage engines
// plug in behind the same traits.
//
// ============================================================================

pub mod event_store;
pub mod snapshot_store;

pub use event_store::{EventStore, InMemoryEventStore, StoreError};
pub use snapshot_store::{InMemorySnapshotStore, Snapshot, SnapshotStore};
