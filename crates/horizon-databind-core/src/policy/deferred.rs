//! Staged edits that take effect only on an explicit apply.

use crate::cell::{BindValue, ValueHost};
use crate::logging::targets;

/// Holds a staged value until it is applied or reverted.
#[derive(Debug, Clone)]
pub struct DeferredUpdatePolicy<T> {
    pending: Option<T>,
    dirty: bool,
}

impl<T> Default for DeferredUpdatePolicy<T> {
    fn default() -> Self {
        Self {
            pending: None,
            dirty: false,
        }
    }
}

impl<T: BindValue> DeferredUpdatePolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value`. The dirty flag is set even when `value` equals the
    /// committed value.
    pub fn set_pending_value(&mut self, value: T) {
        tracing::trace!(target: targets::POLICY, ?value, "staged pending value");
        self.pending = Some(value);
        self.dirty = true;
    }

    /// The staged value, if any.
    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// Mutable access to the staged value, staging a copy of `committed`
    /// first when nothing is staged. Used by the rendering path.
    pub fn pending_mut(&mut self, committed: &T) -> &mut T {
        self.pending.get_or_insert_with(|| committed.clone())
    }

    /// True when a staged value exists and differs from `committed`.
    pub fn has_pending_changes(&self, committed: &T) -> bool {
        self.pending.as_ref().is_some_and(|p| p != committed)
    }

    /// Whether `set_pending_value` has been called since the last apply or revert.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Commit the staged value into `host` if it differs from the committed
    /// one. Returns whether anything was committed.
    pub fn apply_changes<H: ValueHost<T> + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.has_pending_changes(host.current()) {
            return false;
        }
        let Some(value) = self.pending.take() else {
            return false;
        };
        tracing::trace!(target: targets::POLICY, ?value, "applied pending value");
        host.commit(value);
        self.dirty = false;
        true
    }

    /// Drop the staged value without touching the committed one.
    pub fn revert_changes(&mut self) {
        self.pending = None;
        self.dirty = false;
    }
}
