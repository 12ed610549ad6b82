//! Validation of candidate values.

use std::fmt;

use crate::cell::BindValue;
use crate::error::ValidationResult;
use crate::logging::targets;

/// A validator returns the accepted (possibly coerced) value or a message.
pub type Validator<T> = Box<dyn Fn(&T) -> ValidationResult<T> + Send + Sync>;

/// Optional validator plus the message from the last failed check.
pub struct ValidationPolicy<T> {
    validator: Option<Validator<T>>,
    last_error: String,
}

impl<T> Default for ValidationPolicy<T> {
    fn default() -> Self {
        Self {
            validator: None,
            last_error: String::new(),
        }
    }
}

impl<T> fmt::Debug for ValidationPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPolicy")
            .field("validator", &self.validator.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl<T: BindValue> ValidationPolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_validator<F>(&mut self, validator: F)
    where
        F: Fn(&T) -> ValidationResult<T> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Run the validator on `candidate` without recording anything.
    ///
    /// Without a validator every candidate is accepted unchanged.
    pub fn validate(&self, candidate: &T) -> ValidationResult<T> {
        match &self.validator {
            Some(validator) => validator(candidate),
            None => Ok(candidate.clone()),
        }
    }

    /// Validate the committed value and record the outcome.
    pub fn check(&mut self, committed: &T) -> bool {
        match self.validate(committed) {
            Ok(_) => {
                self.last_error.clear();
                true
            }
            Err(message) => {
                self.record_error(message);
                false
            }
        }
    }

    /// Remember a rejection message.
    pub fn record_error(&mut self, message: String) {
        tracing::debug!(target: targets::POLICY, %message, "validation failed");
        self.last_error = message;
    }

    pub fn clear_error(&mut self) {
        self.last_error.clear();
    }

    /// Message from the most recent failure; empty when the last check passed.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    pub fn is_valid(&self) -> bool {
        self.last_error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive() -> ValidationPolicy<i32> {
        let mut policy = ValidationPolicy::new();
        policy.set_validator(|v: &i32| {
            if *v > 0 {
                Ok(*v)
            } else {
                Err("Value must be positive".to_string())
            }
        });
        policy
    }

    #[test]
    fn test_validate_is_pure() {
        let policy = positive();
        assert_eq!(policy.validate(&5), Ok(5));
        assert!(policy.validate(&-1).is_err());
        assert!(policy.last_error().is_empty());
    }

    #[test]
    fn test_check_records_outcome() {
        let mut policy = positive();

        assert!(!policy.check(&0));
        assert_eq!(policy.last_error(), "Value must be positive");
        assert!(!policy.is_valid());

        assert!(policy.check(&3));
        assert!(policy.is_valid());
    }

    #[test]
    fn test_validator_may_coerce() {
        let mut policy = ValidationPolicy::new();
        policy.set_validator(|v: &i32| Ok((*v).clamp(0, 10)));
        assert_eq!(policy.validate(&50), Ok(10));
    }

    #[test]
    fn test_no_validator_accepts_everything() {
        let policy = ValidationPolicy::<String>::new();
        assert!(!policy.has_validator());
        assert_eq!(policy.validate(&"x".to_string()), Ok("x".to_string()));
    }
}
