//! Bounded undo/redo history.

use std::collections::VecDeque;

use crate::cell::{BindValue, ValueHost};
use crate::logging::targets;

/// Default capacity of a history.
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 100;

/// Ordered sequence of committed values with a cursor.
///
/// The cursor always points at the entry matching the committed value;
/// entries before it can be undone to, entries after it redone to.
#[derive(Debug, Clone)]
pub struct HistoryPolicy<T> {
    entries: VecDeque<T>,
    current_index: usize,
    max_size: usize,
}

impl<T> Default for HistoryPolicy<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            current_index: 0,
            max_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

impl<T: BindValue> HistoryPolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history holding at most `max_size` entries (at least one).
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            ..Self::default()
        }
    }

    /// Record `value` as the newest entry, discarding any redo branch.
    pub fn push_history(&mut self, value: T) {
        if !self.entries.is_empty() && self.current_index + 1 < self.entries.len() {
            self.entries.truncate(self.current_index + 1);
        }
        self.entries.push_back(value);
        self.current_index = self.entries.len() - 1;
        self.evict_overflow();
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
            self.current_index = self.current_index.saturating_sub(1);
            tracing::trace!(target: targets::POLICY, "evicted oldest history entry");
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    /// Step back one entry and commit it into `host`.
    pub fn undo<H: ValueHost<T> + ?Sized>(&mut self, host: &mut H) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        self.commit_current(host)
    }

    /// Step forward one entry and commit it into `host`.
    pub fn redo<H: ValueHost<T> + ?Sized>(&mut self, host: &mut H) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.current_index += 1;
        self.commit_current(host)
    }

    fn commit_current<H: ValueHost<T> + ?Sized>(&self, host: &mut H) -> Option<T> {
        let value = self.entries.get(self.current_index)?.clone();
        tracing::trace!(target: targets::POLICY, index = self.current_index, ?value, "history step");
        host.commit(value.clone());
        Some(value)
    }

    pub fn clear_history(&mut self) {
        self.entries.clear();
        self.current_index = 0;
    }

    /// Number of stored entries.
    pub fn history_size(&self) -> usize {
        self.entries.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_history_size(&self) -> usize {
        self.max_size
    }

    /// Change the capacity (at least one), evicting the oldest entries if needed.
    pub fn set_max_history_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.evict_overflow();
    }

    /// Stored entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}
