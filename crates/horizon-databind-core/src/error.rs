//! Error types for Horizon Databind.
//!
//! Most operations in this crate are infallible by contract: applying with
//! nothing pending, undoing with an empty history, or asking a member for a
//! capability it lacks are all silent no-ops. The errors below cover the
//! remaining cases where a caller asked for something specific and needs to
//! know why it was not delivered.

use crate::capability::Capabilities;

/// Result type alias for databind operations.
pub type Result<T> = std::result::Result<T, BindError>;

/// Outcome of running a validator: the accepted (possibly coerced) value, or
/// a human-readable rejection message.
pub type ValidationResult<T> = std::result::Result<T, String>;

/// Errors that can occur in the binding engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// No member is registered under the id.
    #[error("No value registered under id '{id}'")]
    NotFound { id: String },

    /// A member exists but its concrete type differs from the requested one.
    #[error("Value '{id}' has type {actual}, not {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The value behind a handle has been removed from its container.
    #[error("The bound value has been dropped")]
    ValueDropped,

    /// Text could not be parsed into the value type.
    #[error("Cannot parse '{text}' as {type_name}")]
    Parse {
        text: String,
        type_name: &'static str,
    },

    /// A validator rejected the candidate value.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The member does not provide the requested capability.
    #[error("Value '{id}' does not support {capability:?}")]
    CapabilityMissing {
        id: String,
        capability: Capabilities,
    },
}

impl BindError {
    /// Create a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a parse error for the value type `T`.
    pub fn parse<T>(text: impl Into<String>) -> Self {
        Self::Parse {
            text: text.into(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BindError::not_found("speed");
        assert_eq!(err.to_string(), "No value registered under id 'speed'");

        let err = BindError::parse::<i32>("abc");
        assert_eq!(err.to_string(), "Cannot parse 'abc' as i32");

        let err = BindError::validation("Value must be positive");
        assert_eq!(err.to_string(), "Validation failed: Value must be positive");
    }

    #[test]
    fn test_capability_missing_names_flag() {
        let err = BindError::CapabilityMissing {
            id: "a".into(),
            capability: Capabilities::HISTORY,
        };
        assert!(err.to_string().contains("HISTORY"));
    }
}
