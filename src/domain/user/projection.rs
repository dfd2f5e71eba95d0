use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::value_objects::ContactInformation;

// ============================================================================
// User Read Model
// ============================================================================
//
// `UserState` is what the aggregate exposes and what snapshots persist.
// `UserDocument` is the stored view row; mapping between them is pure.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub id: String,
    pub version: u64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub contact_information: Option<ContactInformation>,
    pub shortener_ids: BTreeSet<String>,
}

impl UserState {
    /// State of a user nobody has created yet
    pub fn uncreated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 0,
            first_name: None,
            last_name: None,
            created_at: None,
            contact_information: None,
            shortener_ids: BTreeSet::new(),
        }
    }

    pub fn is_created(&self) -> bool {
        self.created_at.is_some()
    }
}

/// Persisted view of a created user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub contact_information: Option<ContactInformation>,
    #[serde(default)]
    pub shortener_ids: BTreeSet<String>,
}

pub fn map_to_state(document: &UserDocument) -> UserState {
    UserState {
        id: document.id.clone(),
        version: document.version,
        first_name: Some(document.first_name.clone()),
        last_name: Some(document.last_name.clone()),
        created_at: Some(document.created_at),
        contact_information: document.contact_information.clone(),
        shortener_ids: document.shortener_ids.clone(),
    }
}

/// `None` when the user has not been created; there is nothing to store yet
pub fn map_to_document(state: &UserState) -> Option<UserDocument> {
    Some(UserDocument {
        id: state.id.clone(),
        first_name: state.first_name.clone()?,
        last_name: state.last_name.clone()?,
        version: state.version,
        created_at: state.created_at?,
        contact_information: state.contact_information.clone(),
        shortener_ids: state.shortener_ids.clone(),
    })
}
