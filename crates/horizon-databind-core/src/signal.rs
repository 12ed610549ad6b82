//! Signal/slot primitive for change notification.
//!
//! A [`Signal<Args>`] keeps an ordered set of slots and calls each of them
//! with a borrowed `Args` when emitted. Change listeners on monitored and full
//! values are signals underneath, as are a container's `value_changed` and
//! `applied` notifications.
//!
//! Emission copies the slot list out of the connection lock before calling
//! anything, so a slot may connect, disconnect or emit on the same signal.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use horizon_databind_core::Signal;
//!
//! let value_changed = Signal::<String>::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = log.clone();
//! let id = value_changed.connect(move |id: &String| sink.lock().push(id.clone()));
//!
//! value_changed.emit("gain".to_string());
//! value_changed.disconnect(id);
//! value_changed.emit("pan".to_string());
//!
//! assert_eq!(*log.lock(), vec!["gain".to_string()]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identifies one connected slot; pass it to [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Slot storage plus the order slots were connected in.
///
/// Slot map keys reuse freed indices, so iteration order alone would put a
/// late connection ahead of older ones after a disconnect.
struct Slots<Args> {
    map: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> Slots<Args> {
    fn new() -> Self {
        Self {
            map: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, slot: Slot<Args>) -> ConnectionId {
        let id = self.map.insert(slot);
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        if self.map.remove(id).is_none() {
            return false;
        }
        self.order.retain(|connected| *connected != id);
        true
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn ordered(&self) -> Vec<Slot<Args>> {
        self.order.iter().filter_map(|id| self.map.get(*id).cloned()).collect()
    }
}

/// A list of slots invoked with `&Args` on every emission.
///
/// Use `()` for notifications without a payload and a tuple such as
/// `(T, T)` for several values.
pub struct Signal<Args> {
    slots: Mutex<Slots<Args>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots::new()),
            blocked: AtomicBool::new(false),
        }
    }

    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Remove one slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id)
    }

    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    pub fn connection_count(&self) -> usize {
        self.slots.lock().map.len()
    }

    /// While blocked, [`emit`](Self::emit) calls nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Call every slot on the current thread, in connection order.
    ///
    /// Returns how many slots ran.
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "emit suppressed while blocked");
            return 0;
        }

        let snapshot = self.slots.lock().ordered();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");
        for slot in &snapshot {
            slot(&args);
        }
        snapshot.len()
    }

    /// Connect a slot that stays connected only as long as the returned guard.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: Arc::downgrade(self),
            id: self.connect(slot),
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().map.len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

/// Disconnects its slot when dropped.
///
/// Holds the signal weakly, so dropping the guard after the signal is fine.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use horizon_databind_core::Signal;
///
/// let applied = Arc::new(Signal::<()>::new());
/// let count = Arc::new(AtomicUsize::new(0));
/// {
///     let count = count.clone();
///     let _guard = applied.connect_scoped(move |_| {
///         count.fetch_add(1, Ordering::SeqCst);
///     });
///     applied.emit(());
/// }
/// applied.emit(());
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
pub struct ConnectionGuard<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |value: &T| sink.lock().push(value.clone()));
        seen
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<(i32, i32)>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(tag));
        }
        let seen = recorder(&signal);

        assert_eq!(signal.emit((1, 2)), 3);
        assert_eq!(*order.lock(), vec!["first", "second"]);
        assert_eq!(*seen.lock(), vec![(1, 2)]);
    }

    #[test]
    fn test_reconnected_slot_runs_last() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let connect = |tag: &'static str| {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(tag))
        };

        let first = connect("first");
        connect("second");
        signal.disconnect(first);
        connect("third");

        signal.emit(());
        assert_eq!(*order.lock(), vec!["second", "third"]);
    }

    #[test]
    fn test_disconnect() {
        let signal = Signal::<String>::new();
        let seen = recorder(&signal);
        let extra = signal.connect(|_| {});

        assert!(signal.disconnect(extra));
        assert!(!signal.disconnect(extra));
        assert_eq!(signal.connection_count(), 1);

        signal.emit("volume".into());
        signal.disconnect_all();
        signal.emit("pan".into());
        assert_eq!(*seen.lock(), vec!["volume".to_string()]);
    }

    #[test]
    fn test_blocked_signal_calls_nothing() {
        let signal = Signal::<u8>::new();
        let seen = recorder(&signal);

        signal.set_blocked(true);
        assert_eq!(signal.emit(1), 0);
        signal.set_blocked(false);
        signal.emit(2);

        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn test_slot_may_reenter_signal() {
        let signal = Arc::new(Signal::<()>::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let inner = signal.clone();
        let counter = runs.clone();
        signal.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            inner.connect(|_| {});
        });

        signal.emit(());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_guard_disconnects_on_drop() {
        let signal = Arc::new(Signal::<i32>::new());
        let guard = signal.connect_scoped(|_| {});
        assert_eq!(signal.connection_count(), 1);
        drop(guard);
        assert_eq!(signal.connection_count(), 0);

        let late = signal.connect_scoped(|_| {});
        drop(signal);
        drop(late);
    }

    #[test]
    fn test_emit_from_many_threads() {
        let signal = Arc::new(Signal::<usize>::new());
        let total = Arc::new(AtomicUsize::new(0));
        let sum = total.clone();
        signal.connect(move |n| {
            sum.fetch_add(*n, Ordering::SeqCst);
        });

        let emitters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                std::thread::spawn(move || {
                    for n in 1..=10 {
                        signal.emit(n);
                    }
                })
            })
            .collect();
        for emitter in emitters {
            emitter.join().unwrap();
        }
        assert_eq!(total.load(Ordering::SeqCst), 4 * 55);
    }
}
