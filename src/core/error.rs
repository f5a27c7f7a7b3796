//! Crate error types
//!
//! Nothing in the governance core is fatal: dispatch faults are isolated per
//! handler and approval faults resolve to the configured timeout action.
//! [`GateError`] covers the remaining fallible edges, chiefly policy
//! (de)serialization.

use thiserror::Error;

/// Errors that can occur in the governance core
#[derive(Error, Debug)]
pub enum GateError {
    /// Policy or payload JSON could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A policy value is structurally valid but unusable
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

impl GateError {
    /// Create an invalid-policy error from a message
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        GateError::InvalidPolicy(msg.into())
    }
}

/// Result type alias for governance operations
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GateError::invalid_policy("empty pattern");
        assert_eq!(err.to_string(), "Invalid policy: empty pattern");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GateError = serde_err.into();
        assert!(matches!(err, GateError::Serialization(_)));
    }
}
