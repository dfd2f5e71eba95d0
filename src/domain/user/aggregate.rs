use crate::event_sourcing::core::{Aggregate, DomainEvent};
use super::commands::UserCommand;
use super::errors::UserError;
use super::events::*;
use super::projection::UserState;
use super::value_objects::ContactInformation;

// ============================================================================
// User Aggregate - Business Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UserAggregate {
    state: UserState,
}

impl UserAggregate {
    /// Reject commands that need an existing user
    fn validate_created(&self) -> Result<(), UserError> {
        if self.state.is_created() {
            Ok(())
        } else {
            Err(UserError::NotCreated(self.state.id.clone()))
        }
    }

    fn out_of_order(&self, event: &UserEvent) -> UserError {
        UserError::EventOutOfOrder {
            user_id: self.state.id.clone(),
            event_type: event.event_type(),
            version: self.state.version,
        }
    }
}

impl Aggregate for UserAggregate {
    type Event = UserEvent;
    type Command = UserCommand;
    type Error = UserError;
    type State = UserState;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn new(id: impl Into<String>) -> Self {
        Self {
            state: UserState::uncreated(id),
        }
    }

    fn rehydrate(state: UserState) -> Self {
        Self { state }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UserCommand::CreateUser { first_name, last_name, contact_information, requested_at } => {
                if self.state.is_created() {
                    return Err(UserError::AlreadyCreated(self.state.id.clone()));
                }
                if first_name.trim().is_empty() {
                    return Err(UserError::EmptyFirstName);
                }
                if last_name.trim().is_empty() {
                    return Err(UserError::EmptyLastName);
                }
                if contact_information.as_ref().is_some_and(ContactInformation::is_empty) {
                    return Err(UserError::EmptyContactInfo);
                }

                Ok(vec![UserEvent::Created(UserCreated {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    contact_information: contact_information.clone(),
                    created_at: *requested_at,
                })])
            }

            UserCommand::CreateContactInfo { email, phone_number } => {
                self.validate_created()?;

                if email.is_none() && phone_number.is_none() {
                    return Err(UserError::EmptyContactInfo);
                }

                Ok(vec![UserEvent::ContactInfoUpdated(ContactInfoUpdated {
                    email: email.clone(),
                    phone_number: phone_number.clone(),
                })])
            }

            UserCommand::AddShortener { user_id, shortener_id } => {
                self.validate_created()?;

                if user_id != &self.state.id {
                    return Err(UserError::UserIdMismatch {
                        expected: self.state.id.clone(),
                        actual: user_id.clone(),
                    });
                }
                if shortener_id.trim().is_empty() {
                    return Err(UserError::EmptyShortenerId);
                }

                // Already-known ids are still accepted; the set absorbs the duplicate on apply
                Ok(vec![UserEvent::ShortenerAdded(ShortenerAdded {
                    shortener_id: shortener_id.clone(),
                })])
            }
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            UserEvent::Created(e) => {
                if self.state.is_created() {
                    return Err(self.out_of_order(event));
                }
                self.state.first_name = Some(e.first_name.clone());
                self.state.last_name = Some(e.last_name.clone());
                self.state.contact_information = e.contact_information.clone();
                self.state.created_at = Some(e.created_at);
            }
            UserEvent::ContactInfoUpdated(e) => {
                if !self.state.is_created() {
                    return Err(self.out_of_order(event));
                }
                self.state.contact_information = Some(ContactInformation {
                    email: e.email.clone(),
                    phone_number: e.phone_number.clone(),
                });
            }
            UserEvent::ShortenerAdded(e) => {
                if !self.state.is_created() {
                    return Err(self.out_of_order(event));
                }
                self.state.shortener_ids.insert(e.shortener_id.clone());
            }
        }

        self.state.version += 1;
        tracing::trace!(
            user_id = %self.state.id,
            event_type = event.event_type(),
            version = self.state.version,
            "Applied event"
        );
        Ok(())
    }

    fn aggregate_id(&self) -> &str {
        &self.state.id
    }

    fn version(&self) -> u64 {
        self.state.version
    }

    fn state(&self) -> UserState {
        self.state.clone()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
