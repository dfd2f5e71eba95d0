use serde::{Deserialize, Serialize};

// ============================================================================
// Error Classification
// ============================================================================
//
// Rejected and InvalidInput are ordinary return values handed back to the
// caller. InternalFault means a programming or data-corruption bug.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Command breaks a domain rule (e.g. duplicate creation)
    Rejected,
    /// Command is structurally malformed (e.g. missing required field)
    InvalidInput,
    /// Unexpected failure, e.g. an event applied out of order
    InternalFault,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Rejected => "rejected",
            ErrorClass::InvalidInput => "invalid_input",
            ErrorClass::InternalFault => "internal_fault",
        }
    }

    /// Whether the caller may surface this error to an end user as-is
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ErrorClass::InternalFault)
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know which class they belong to
pub trait ClassifiedError: std::error::Error + Send + Sync + 'static {
    fn class(&self) -> ErrorClass;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classes() {
        assert!(ErrorClass::Rejected.is_rejection());
        assert!(ErrorClass::InvalidInput.is_rejection());
        assert!(!ErrorClass::InternalFault.is_rejection());
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(ErrorClass::InvalidInput.to_string(), "invalid_input");
        assert_eq!(ErrorClass::InternalFault.as_str(), "internal_fault");
    }
}
