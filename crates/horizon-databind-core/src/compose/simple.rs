use std::any::type_name;

use crate::capability::{Capabilities, ValueControl};
use crate::cell::{BindValue, EditMode, ValueCell};
use crate::widget::{DrawContext, Widget, WidgetHints, WidgetSlot};

/// A value with no optional behaviors.
///
/// Edits made through the widget are committed directly.
#[derive(Debug)]
pub struct SimpleValue<T: BindValue> {
    cell: ValueCell<T>,
    widget: WidgetSlot<T>,
    hints: WidgetHints<T>,
}

impl<T: BindValue> SimpleValue<T> {
    pub const CAPABILITIES: Capabilities = Capabilities::empty();

    pub fn new(initial: T) -> Self {
        Self {
            cell: ValueCell::new(initial),
            widget: WidgetSlot::default(),
            hints: WidgetHints::default(),
        }
    }

    pub fn value(&self) -> &T {
        self.cell.value()
    }

    /// Unsynchronized access to the underlying cell.
    pub fn cell_mut(&mut self) -> &mut ValueCell<T> {
        &mut self.cell
    }

    /// Assign, returning whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        self.cell.assign(value)
    }

    pub fn hints(&self) -> &WidgetHints<T> {
        &self.hints
    }

    pub fn hints_mut(&mut self) -> &mut WidgetHints<T> {
        &mut self.hints
    }

    pub fn set_widget(&mut self, widget: impl Widget<T> + 'static) {
        self.widget.set(widget);
    }
}

impl<T: BindValue + Default> Default for SimpleValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BindValue> ValueControl for SimpleValue<T> {
    fn name(&self) -> String {
        self.cell.name().to_string()
    }

    fn set_name(&mut self, name: &str) {
        self.cell.set_name(name);
    }

    fn tooltip(&self) -> String {
        self.cell.tooltip().to_string()
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.cell.set_tooltip(tooltip);
    }

    fn edit_mode(&self) -> EditMode {
        self.cell.edit_mode()
    }

    fn set_edit_mode(&mut self, mode: EditMode) {
        self.cell.set_edit_mode(mode);
    }

    fn draw(&mut self, label: &str) -> bool {
        let mut scratch = self.cell.value().clone();
        let response = self.widget.draw(DrawContext {
            label,
            value: &mut scratch,
            edit_mode: self.cell.edit_mode(),
            tooltip: self.cell.tooltip(),
            hints: &self.hints,
            has_pending: false,
            error: "",
            text: None,
        });
        response.changed && self.cell.is_editable() && self.cell.assign(scratch)
    }

    fn is_changed(&self) -> bool {
        self.cell.is_changed()
    }

    fn clear_changed(&mut self) {
        self.cell.clear_changed();
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DeferredUpdate, ExternalSync};
    use crate::widget::{widget_fn, Response};

    fn flipping_toggle() -> SimpleValue<bool> {
        let mut toggle = SimpleValue::new(false);
        toggle.set_widget(widget_fn(|cx: DrawContext<'_, bool>| {
            *cx.value = !*cx.value;
            Response::changed()
        }));
        toggle
    }

    #[test]
    fn test_draw_commits_edit() {
        let mut toggle = flipping_toggle();
        assert!(toggle.draw("Enabled"));
        assert!(*toggle.value());
        assert!(toggle.is_changed());
    }

    #[test]
    fn test_read_only_discards_edit() {
        let mut toggle = flipping_toggle();
        toggle.set_edit_mode(EditMode::ReadOnly);
        assert!(!toggle.draw("Enabled"));
        assert!(!*toggle.value());
        assert!(!toggle.is_changed());
    }

    #[test]
    fn test_no_widget_draws_nothing() {
        let mut value = SimpleValue::new(1);
        assert!(!value.draw("x"));
    }

    #[test]
    fn test_has_no_capabilities() {
        let value = SimpleValue::new(1.5f32);
        let control: &dyn ValueControl = &value;
        assert!(control.capabilities().is_empty());
        assert!(control.query_interface::<dyn DeferredUpdate>().is_none());
        assert!(control.query_interface::<dyn ExternalSync>().is_none());
        assert_eq!(control.type_name(), "f32");
    }
}
