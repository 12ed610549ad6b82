//! Per-instance reader/writer locking.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Guards one value's state with its own reader/writer lock.
///
/// Guards release on drop, so every exit path unlocks. No fairness between
/// readers and writers is promised.
#[derive(Debug, Default)]
pub struct ThreadSafetyPolicy<S> {
    state: RwLock<S>,
}

impl<S> ThreadSafetyPolicy<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Shared access; any number of readers may hold it at once.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, S> {
        self.state.read()
    }

    /// Exclusive access.
    pub fn write_lock(&self) -> RwLockWriteGuard<'_, S> {
        self.state.write()
    }
}
