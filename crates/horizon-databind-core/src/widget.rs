//! The seam to the rendering collaborator.
//!
//! Composed values never paint anything themselves. Each one owns a
//! [`WidgetSlot`] into which the rendering backend installs a [`Widget`];
//! `draw(label)` prepares a [`DrawContext`] and hands it to that widget. An
//! empty slot draws nothing and reports no change.
//!
//! Closures work as widgets:
//!
//! ```
//! use horizon_databind_core::widget::{widget_fn, DrawContext, Response};
//! use horizon_databind_core::{SimpleValue, ValueControl};
//!
//! let mut volume = SimpleValue::new(5);
//! volume.set_widget(widget_fn(|cx: DrawContext<'_, i32>| {
//!     *cx.value += 1;
//!     Response::changed()
//! }));
//!
//! assert!(volume.draw("Volume"));
//! assert_eq!(*volume.value(), 6);
//! ```

use std::fmt;

use crate::cell::EditMode;

/// Which kind of control the backend should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetKind {
    /// Let the backend pick from the value type.
    #[default]
    Auto,
    Checkbox,
    Input,
    Slider,
    Drag,
    Combo,
    Radio,
    Color,
    Vector,
    Multiline,
}

/// Presentation hints carried by a composed value.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetHints<T> {
    pub kind: WidgetKind,
    /// Inclusive range for sliders and drags.
    pub range: Option<(T, T)>,
    /// Drag speed.
    pub speed: Option<f32>,
    /// Labels for combo and radio controls.
    pub options: Vec<String>,
}

impl<T> Default for WidgetHints<T> {
    fn default() -> Self {
        Self {
            kind: WidgetKind::Auto,
            range: None,
            speed: None,
            options: Vec::new(),
        }
    }
}

impl<T> WidgetHints<T> {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, min: T, max: T) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything a widget needs for one draw call.
pub struct DrawContext<'a, T> {
    pub label: &'a str,
    /// The value to display and edit in place.
    ///
    /// For deferred values this is the staged value; for read-only and
    /// view-only values edits are discarded.
    pub value: &'a mut T,
    pub edit_mode: EditMode,
    pub tooltip: &'a str,
    pub hints: &'a WidgetHints<T>,
    /// A staged value differs from the committed one.
    pub has_pending: bool,
    /// Last validation message, empty if none.
    pub error: &'a str,
    /// Formatted text to show next to the control.
    pub text: Option<&'a str>,
}

impl<T> DrawContext<'_, T> {
    pub fn is_editable(&self) -> bool {
        self.edit_mode == EditMode::Editable
    }
}

/// What happened during a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// The user changed the value.
    pub changed: bool,
    /// The pointer is over the control.
    pub hovered: bool,
    /// The user asked for a context menu.
    pub context_menu_requested: bool,
}

impl Response {
    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn with_hover(mut self, hovered: bool) -> Self {
        self.hovered = hovered;
        self
    }

    pub fn with_context_menu(mut self, requested: bool) -> Self {
        self.context_menu_requested = requested;
        self
    }
}

/// A control for values of type `T`, supplied by the rendering backend.
pub trait Widget<T>: Send + Sync {
    fn draw(&mut self, cx: DrawContext<'_, T>) -> Response;
}

impl<T, F> Widget<T> for F
where
    F: FnMut(DrawContext<'_, T>) -> Response + Send + Sync,
{
    fn draw(&mut self, cx: DrawContext<'_, T>) -> Response {
        self(cx)
    }
}

/// Pin a closure's signature so it can be used as a [`Widget`].
pub fn widget_fn<T, F>(f: F) -> F
where
    F: FnMut(DrawContext<'_, T>) -> Response + Send + Sync,
{
    f
}

/// Holds the widget installed for a value, if any.
pub struct WidgetSlot<T> {
    widget: Option<Box<dyn Widget<T>>>,
}

impl<T> Default for WidgetSlot<T> {
    fn default() -> Self {
        Self { widget: None }
    }
}

impl<T> fmt::Debug for WidgetSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetSlot")
            .field("bound", &self.widget.is_some())
            .finish()
    }
}

impl<T> WidgetSlot<T> {
    pub fn set(&mut self, widget: impl Widget<T> + 'static) {
        self.widget = Some(Box::new(widget));
    }

    /// Draw through the installed widget; an empty slot reports nothing.
    pub fn draw(&mut self, cx: DrawContext<'_, T>) -> Response {
        match &mut self.widget {
            Some(widget) => widget.draw(cx),
            None => Response::unchanged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_draws_nothing() {
        let mut slot = WidgetSlot::<i32>::default();
        let hints = WidgetHints::default();
        let mut value = 3;
        let response = slot.draw(DrawContext {
            label: "x",
            value: &mut value,
            edit_mode: EditMode::Editable,
            tooltip: "",
            hints: &hints,
            has_pending: false,
            error: "",
            text: None,
        });
        assert_eq!(response, Response::unchanged());
        assert_eq!(value, 3);
    }

    #[test]
    fn test_closure_widget_sees_hints() {
        let mut slot = WidgetSlot::<f32>::default();
        slot.set(widget_fn(|cx: DrawContext<'_, f32>| {
            if let Some((_, max)) = cx.hints.range {
                *cx.value = max;
            }
            Response::changed().with_hover(true)
        }));

        let hints = WidgetHints::new(WidgetKind::Slider).with_range(0.0, 1.0);
        let mut value = 0.25;
        let response = slot.draw(DrawContext {
            label: "Opacity",
            value: &mut value,
            edit_mode: EditMode::Editable,
            tooltip: "",
            hints: &hints,
            has_pending: false,
            error: "",
            text: None,
        });
        assert!(response.changed);
        assert!(response.hovered);
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_hints_builder() {
        let hints = WidgetHints::<i32>::new(WidgetKind::Combo).with_options(["Low", "High"]);
        assert_eq!(hints.options, vec!["Low".to_string(), "High".to_string()]);
        assert_eq!(hints.range, None);
    }
}
