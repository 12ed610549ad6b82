//! The minimal value holder every bound value is built on.
//!
//! A [`ValueCell<T>`] owns the committed value, the changed flag and the
//! display metadata. It performs no validation and no locking; those
//! behaviors come from the policies in [`crate::policy`].

use std::fmt;

use crate::policy::ValueSource;
use crate::text::TextValue;

/// Requirements on a type that can be bound.
///
/// Blanket-implemented; a custom type needs `Clone + PartialEq + Debug`, a
/// [`TextValue`] impl (possibly empty), and must be thread-safe.
pub trait BindValue: Clone + PartialEq + fmt::Debug + TextValue + Send + Sync + 'static {}

impl<T> BindValue for T where T: Clone + PartialEq + fmt::Debug + TextValue + Send + Sync + 'static {}

/// How the rendering collaborator should present a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    /// The user may change the value.
    #[default]
    Editable,
    /// Shown as a disabled control.
    ReadOnly,
    /// Shown as plain text only.
    ViewOnly,
}

/// Committed value plus change flag and display metadata.
#[derive(Debug, Clone)]
pub struct ValueCell<T> {
    value: T,
    changed: bool,
    name: String,
    tooltip: String,
    edit_mode: EditMode,
}

impl<T: BindValue> ValueCell<T> {
    /// Create a cell holding `initial`. The changed flag starts clear.
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            changed: false,
            name: String::new(),
            tooltip: String::new(),
            edit_mode: EditMode::default(),
        }
    }

    /// The committed value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable access for the rendering collaborator. Does not touch the
    /// changed flag.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Store `new_value`, setting the changed flag to whether it differs
    /// from the previous value. Returns the flag.
    pub fn assign(&mut self, new_value: T) -> bool {
        self.changed = new_value != self.value;
        self.value = new_value;
        self.changed
    }

    /// Store a value and return the previous one, leaving the changed flag alone.
    pub(crate) fn replace(&mut self, new_value: T) -> T {
        std::mem::replace(&mut self.value, new_value)
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    /// Whether the user may change the value.
    pub fn is_editable(&self) -> bool {
        self.edit_mode == EditMode::Editable
    }
}

/// The accessors a policy needs from the value it is attached to.
///
/// Policies never reach into each other; everything they do to the committed
/// value goes through this trait.
pub trait ValueHost<T> {
    /// The committed value.
    fn current(&self) -> &T;

    /// Commit a new value.
    fn commit(&mut self, value: T);

    /// Whether staged user edits are waiting to be applied.
    ///
    /// Hosts without deferred update never have any.
    fn has_unapplied_edits(&self) -> bool {
        false
    }

    /// Record where the last committed change came from.
    fn record_source(&mut self, source: ValueSource) {
        let _ = source;
    }
}

impl<T: BindValue> ValueHost<T> for ValueCell<T> {
    fn current(&self) -> &T {
        &self.value
    }

    fn commit(&mut self, value: T) {
        self.assign(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_unchanged() {
        let cell = ValueCell::new(5);
        assert_eq!(*cell.value(), 5);
        assert!(!cell.is_changed());
        assert_eq!(cell.edit_mode(), EditMode::Editable);
        assert!(cell.is_editable());
    }

    #[test]
    fn test_assign_tracks_inequality() {
        let mut cell = ValueCell::new(5);

        assert!(cell.assign(6));
        assert!(cell.is_changed());

        // Assigning the same value reports no change, even right after one.
        assert!(!cell.assign(6));
        assert!(!cell.is_changed());

        cell.assign(7);
        cell.clear_changed();
        assert!(!cell.is_changed());
        assert_eq!(*cell.value(), 7);
    }

    #[test]
    fn test_value_mut_leaves_flag() {
        let mut cell = ValueCell::new(String::from("a"));
        cell.value_mut().push('b');
        assert_eq!(cell.value(), "ab");
        assert!(!cell.is_changed());
    }

    #[test]
    fn test_metadata() {
        let mut cell = ValueCell::new(false);
        cell.set_name("Enabled");
        cell.set_tooltip("Turns the feature on");
        cell.set_edit_mode(EditMode::ReadOnly);

        assert_eq!(cell.name(), "Enabled");
        assert_eq!(cell.tooltip(), "Turns the feature on");
        assert!(!cell.is_editable());
    }
}
