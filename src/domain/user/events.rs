use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{ContactInformation, Email, PhoneNumber};

// ============================================================================
// User Domain Events
// ============================================================================

/// Union type for all user events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    #[serde(rename = "UserCreated")]
    Created(UserCreated),
    ContactInfoUpdated(ContactInfoUpdated),
    ShortenerAdded(ShortenerAdded),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => "UserCreated",
            UserEvent::ContactInfoUpdated(_) => "ContactInfoUpdated",
            UserEvent::ShortenerAdded(_) => "ShortenerAdded",
        }
    }
}

// Individual event types

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    pub first_name: String,
    pub last_name: String,
    pub contact_information: Option<ContactInformation>,
    pub created_at: DateTime<Utc>,
}

/// Replaces the whole contact record (last write wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfoUpdated {
    pub email: Option<Email>,
    pub phone_number: Option<PhoneNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortenerAdded {
    pub shortener_id: String,
}
