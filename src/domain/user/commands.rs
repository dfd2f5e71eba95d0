use chrono::{DateTime, Utc};

use super::value_objects::{ContactInformation, Email, PhoneNumber};

// ============================================================================
// User Domain Commands
// ============================================================================
//
// Commands carry intent only; version checks belong to the store.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    CreateUser {
        first_name: String,
        last_name: String,
        contact_information: Option<ContactInformation>,
        /// Becomes the user's `created_at`; fixed at construction so validation is repeatable
        requested_at: DateTime<Utc>,
    },
    CreateContactInfo {
        email: Option<Email>,
        phone_number: Option<PhoneNumber>,
    },
    AddShortener {
        user_id: String,
        shortener_id: String,
    },
}

impl UserCommand {
    pub fn create_user(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact_information: Option<ContactInformation>,
    ) -> Self {
        UserCommand::CreateUser {
            first_name: first_name.into(),
            last_name: last_name.into(),
            contact_information,
            requested_at: Utc::now(),
        }
    }

    pub fn create_contact_info(email: Option<Email>, phone_number: Option<PhoneNumber>) -> Self {
        UserCommand::CreateContactInfo { email, phone_number }
    }

    pub fn add_shortener(user_id: impl Into<String>, shortener_id: impl Into<String>) -> Self {
        UserCommand::AddShortener {
            user_id: user_id.into(),
            shortener_id: shortener_id.into(),
        }
    }

    /// Stable name used for logging and metric labels
    pub fn command_type(&self) -> &'static str {
        match self {
            UserCommand::CreateUser { .. } => "CreateUser",
            UserCommand::CreateContactInfo { .. } => "CreateContactInfo",
            UserCommand::AddShortener { .. } => "AddShortener",
        }
    }
}
