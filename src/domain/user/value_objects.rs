use serde::{Deserialize, Serialize};

// ============================================================================
// User Value Objects
// ============================================================================

/// User email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(pub String);

impl Email {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// User phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(pub String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact details; either part may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInformation {
    pub email: Option<Email>,
    pub phone_number: Option<PhoneNumber>,
}

impl ContactInformation {
    pub fn new(email: Option<Email>, phone_number: Option<PhoneNumber>) -> Self {
        Self { email, phone_number }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(Email::new(email)),
            phone_number: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_information_emptiness() {
        assert!(ContactInformation::default().is_empty());
        assert!(!ContactInformation::with_email("a@b").is_empty());
        assert!(!ContactInformation::new(None, Some(PhoneNumber::new("+421 901 000 000"))).is_empty());
    }
}
