//! Event-sourced user aggregate.
//!
//! Commands are validated against current state without mutating it; accepted
//! commands yield events, and state only changes by applying those events.
//! The in-memory stores and [`domain::user::UserCommandHandler`] show how a
//! persistence layer drives the aggregate one command at a time.

pub mod domain;
pub mod event_sourcing;
pub mod metrics;
pub mod utils;

pub use domain::user::{
    CommandError, ContactInformation, Email, HandlerConfig, PhoneNumber, UserAggregate,
    UserCommand, UserCommandHandler, UserDocument, UserError, UserEvent, UserState,
};
pub use event_sourcing::{Aggregate, ClassifiedError, ErrorClass, ValidationOutcome};
