//! Change listeners.

use crate::cell::BindValue;
use crate::signal::{ConnectionId, Signal};

/// `(old, new)` listeners plus argument-less listeners, called in
/// registration order.
///
/// Callers invoke [`notify_change`](Self::notify_change) only after releasing
/// any lock guarding the value, so a listener may read or write the value
/// it observes.
#[derive(Debug)]
pub struct ChangeNotificationPolicy<T: 'static> {
    changed: Signal<(T, T)>,
}

impl<T: 'static> Default for ChangeNotificationPolicy<T> {
    fn default() -> Self {
        Self {
            changed: Signal::new(),
        }
    }
}

impl<T: BindValue> ChangeNotificationPolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called with the old and new committed values.
    pub fn add_change_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.changed.connect(move |(old, new)| listener(old, new))
    }

    /// Register a listener called with no arguments.
    pub fn add_simple_change_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.changed.connect(move |_| listener())
    }

    /// Remove a listener registered through either method.
    pub fn remove_listener(&self, id: ConnectionId) -> bool {
        self.changed.disconnect(id)
    }

    pub fn clear_change_listeners(&self) {
        self.changed.disconnect_all();
    }

    pub fn listener_count(&self) -> usize {
        self.changed.connection_count()
    }

    /// Fire every listener once if `old != new`. Returns whether anything fired.
    pub fn notify_change(&self, old: T, new: T) -> bool {
        if old == new {
            return false;
        }
        self.changed.emit((old, new));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_listeners_fire_once_per_transition() {
        let policy = ChangeNotificationPolicy::<i32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let simple_hits = Arc::new(Mutex::new(0));

        let s = seen.clone();
        policy.add_change_listener(move |old, new| s.lock().push((*old, *new)));
        let h = simple_hits.clone();
        policy.add_simple_change_listener(move || *h.lock() += 1);

        assert!(policy.notify_change(1, 2));
        assert!(!policy.notify_change(2, 2));

        assert_eq!(*seen.lock(), vec![(1, 2)]);
        assert_eq!(*simple_hits.lock(), 1);
    }

    #[test]
    fn test_remove_listener() {
        let policy = ChangeNotificationPolicy::<i32>::new();
        let hits = Arc::new(Mutex::new(0));

        let h = hits.clone();
        let id = policy.add_simple_change_listener(move || *h.lock() += 1);
        assert_eq!(policy.listener_count(), 1);
        assert!(policy.remove_listener(id));

        policy.notify_change(0, 1);
        assert_eq!(*hits.lock(), 0);
        assert_eq!(policy.listener_count(), 0);
    }

    #[test]
    fn test_removing_one_kind_keeps_the_other() {
        let policy = ChangeNotificationPolicy::<i32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        let full = policy.add_change_listener(move |_, new| s.lock().push(*new));
        let simple = policy.add_simple_change_listener(|| {});
        assert_ne!(full, simple);

        assert!(policy.remove_listener(simple));
        policy.notify_change(0, 7);
        assert_eq!(*seen.lock(), vec![7]);
    }
}
