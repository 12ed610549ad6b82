//! Non-owning, cross-thread access to a thread-safe value.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::cell::BindValue;
use crate::error::{BindError, Result};
use crate::logging::targets;
use crate::policy::ValueSource;

/// The thread-safe entry points shared by monitored and full values.
pub trait SharedValue<T>: Send + Sync {
    fn get(&self) -> T;
    /// Returns whether the committed value changed.
    fn set(&self, value: T) -> bool;
    fn sync_from_external(&self) -> bool;
    fn last_source(&self) -> ValueSource;
}

/// A weak reference to a thread-safe value owned by a container slot.
///
/// Once the owning value is dropped, reads return `None` and writes return
/// [`BindError::ValueDropped`].
pub struct ValueHandle<T> {
    inner: Weak<dyn SharedValue<T>>,
}

impl<T> Clone for ValueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for ValueHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T: BindValue> ValueHandle<T> {
    pub(crate) fn new(shared: &Arc<dyn SharedValue<T>>) -> Self {
        Self {
            inner: Arc::downgrade(shared),
        }
    }

    fn upgrade(&self) -> Option<Arc<dyn SharedValue<T>>> {
        let shared = self.inner.upgrade();
        if shared.is_none() {
            tracing::warn!(target: targets::COMPOSE, "access through handle to a dropped value");
        }
        shared
    }

    /// Whether the owning value still exists.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn get(&self) -> Option<T> {
        self.upgrade().map(|shared| shared.get())
    }

    /// Write through the handle. Returns whether the committed value changed.
    pub fn set(&self, value: T) -> Result<bool> {
        let shared = self.upgrade().ok_or(BindError::ValueDropped)?;
        Ok(shared.set(value))
    }

    pub fn sync_from_external(&self) -> Result<bool> {
        let shared = self.upgrade().ok_or(BindError::ValueDropped)?;
        Ok(shared.sync_from_external())
    }

    pub fn last_source(&self) -> Option<ValueSource> {
        self.upgrade().map(|shared| shared.last_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::MonitoredValue;

    #[test]
    fn test_handle_follows_value() {
        let value = MonitoredValue::new(1);
        let handle = value.handle();

        assert!(handle.is_alive());
        assert_eq!(handle.set(5), Ok(true));
        assert_eq!(value.get(), 5);
        assert_eq!(handle.get(), Some(5));
        assert_eq!(handle.last_source(), Some(ValueSource::User));
    }

    #[test]
    fn test_handle_tolerates_drop() {
        let value = MonitoredValue::new(1);
        let handle = value.handle();
        drop(value);

        assert!(!handle.is_alive());
        assert_eq!(handle.get(), None);
        assert_eq!(handle.set(2), Err(BindError::ValueDropped));
        assert_eq!(handle.sync_from_external(), Err(BindError::ValueDropped));
    }

    #[test]
    fn test_handle_from_other_thread() {
        let value = MonitoredValue::new(0u32);
        let handle = value.handle();

        let writer = std::thread::spawn(move || {
            for i in 1..=100 {
                handle.set(i).unwrap();
            }
        });
        writer.join().unwrap();
        assert_eq!(value.get(), 100);
    }
}
