use crate::event_sourcing::core::{ClassifiedError, ErrorClass};

// ============================================================================
// User Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UserError {
    #[error("User {0} already exists")]
    AlreadyCreated(String),

    #[error("User {0} has not been created yet")]
    NotCreated(String),

    #[error("First name cannot be empty")]
    EmptyFirstName,

    #[error("Last name cannot be empty")]
    EmptyLastName,

    #[error("Contact information needs an email or a phone number")]
    EmptyContactInfo,

    #[error("Shortener id cannot be empty")]
    EmptyShortenerId,

    #[error("Command addressed to user {actual} was sent to user {expected}")]
    UserIdMismatch { expected: String, actual: String },

    #[error("Event {event_type} cannot be applied to user {user_id} at version {version}")]
    EventOutOfOrder {
        user_id: String,
        event_type: &'static str,
        version: u64,
    },
}

impl ClassifiedError for UserError {
    fn class(&self) -> ErrorClass {
        match self {
            UserError::AlreadyCreated(_) | UserError::NotCreated(_) => ErrorClass::Rejected,
            UserError::EmptyFirstName
            | UserError::EmptyLastName
            | UserError::EmptyContactInfo
            | UserError::EmptyShortenerId
            | UserError::UserIdMismatch { .. } => ErrorClass::InvalidInput,
            UserError::EventOutOfOrder { .. } => ErrorClass::InternalFault,
        }
    }
}
