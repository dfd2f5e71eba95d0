// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with value objects, events,
// commands, errors, the aggregate itself and its command handler.
//
// This layer only depends on the generic event sourcing core and stores.
//
// ============================================================================

pub mod user;
