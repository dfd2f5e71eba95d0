// ============================================================================
// User Domain - Business Logic for User Aggregate
// ============================================================================
//
// This module contains ALL User-specific code:
// - Value objects (Email, PhoneNumber, ContactInformation)
// - Events (UserCreated, ContactInfoUpdated, ShortenerAdded)
// - Commands (CreateUser, CreateContactInfo, AddShortener)
// - Errors (UserError enum)
// - Aggregate (UserAggregate with business logic)
// - Projection (UserState snapshot, UserDocument view, mapping)
// - Command Handler (UserCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod projection;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use projection::*;
pub use aggregate::*;
pub use command_handler::*;
