//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Confidence must be within [0.0, 1.0], got {0}")]
    InvalidConfidence(f64),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Invalid consensus level: {0}")]
    InvalidConsensusLevel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Check if this error was caused by a malformed agent response
    pub fn is_invalid_confidence(&self) -> bool {
        matches!(self, DomainError::InvalidConfidence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_confidence_display() {
        let error = DomainError::InvalidConfidence(1.5);
        assert_eq!(
            error.to_string(),
            "Confidence must be within [0.0, 1.0], got 1.5"
        );
    }

    #[test]
    fn test_is_invalid_confidence_check() {
        assert!(DomainError::InvalidConfidence(-0.1).is_invalid_confidence());
        assert!(!DomainError::UnknownTaskType("x".to_string()).is_invalid_confidence());
    }
}
