//! A remembered default.

use crate::cell::{BindValue, ValueHost};
use super::ValueSource;

#[derive(Debug, Clone)]
pub struct DefaultValuePolicy<T> {
    default: T,
}

impl<T: BindValue> DefaultValuePolicy<T> {
    pub fn new(default: T) -> Self {
        Self { default }
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn set_default_value(&mut self, default: T) {
        self.default = default;
    }

    pub fn is_default(&self, value: &T) -> bool {
        *value == self.default
    }

    /// Commit the default into `host` and tag it. Returns the replaced value
    /// when it differed.
    pub fn reset_to_default<H: ValueHost<T> + ?Sized>(&self, host: &mut H) -> Option<T> {
        if self.is_default(host.current()) {
            return None;
        }
        let old = host.current().clone();
        host.commit(self.default.clone());
        host.record_source(ValueSource::Default);
        Some(old)
    }
}
