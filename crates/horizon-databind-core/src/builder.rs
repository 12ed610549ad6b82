//! Fluent configuration of composed values.
//!
//! [`ValueBuilder`] offers one chain of setters for every composed type.
//! Setters a type has no use for are silently ignored, so the same chain
//! works whether the value validates, keeps history or does neither:
//!
//! ```
//! use horizon_databind_core::builder::make_builder;
//! use horizon_databind_core::{ConfigValue, SimpleValue, ValueControl};
//!
//! let volume = make_builder(ConfigValue::new(50))
//!     .with_name("Volume")
//!     .with_range(0, 100)
//!     .with_validator(|v: &i32| if *v >= 0 { Ok(*v) } else { Err("negative".into()) })
//!     .with_default_value(75)
//!     .build();
//! assert_eq!(*volume.default_value(), 75);
//!
//! // A simple value has no validator; the call is a no-op.
//! let status = make_builder(SimpleValue::new(String::from("idle")))
//!     .with_name("Status")
//!     .with_validator(|v: &String| Ok(v.clone()))
//!     .read_only()
//!     .build();
//! assert_eq!(status.name(), "Status");
//! ```

use std::any::type_name;

use crate::capability::{ImmediateApply, TextRepresentation, ValueControl, VisibilityControl};
use crate::cell::{BindValue, EditMode};
use crate::compose::{ConfigValue, FullValue, MonitoredValue, MonitoredValueWithText, SimpleValue};
use crate::container::ValueContainer;
use crate::logging::targets;
use crate::policy::Validator;
use crate::widget::{Widget, WidgetHints, WidgetKind};

/// A change listener taking no arguments.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

fn ignored<C: ?Sized>(option: &'static str) {
    tracing::trace!(
        target: targets::BUILDER,
        option,
        type_name = type_name::<C>(),
        "option not supported, ignored"
    );
}

/// The per-type hooks behind [`ValueBuilder`].
///
/// Every optional hook defaults to a no-op; a composed type overrides the
/// ones it supports.
pub trait Configure: ValueControl + Sized {
    type Value: BindValue;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<Self::Value>;

    fn install_widget<W: Widget<Self::Value> + 'static>(&mut self, widget: W);

    fn configure_validator(&mut self, validator: Validator<Self::Value>) {
        let _ = validator;
        ignored::<Self>("validator");
    }

    fn configure_default_value(&mut self, default: Self::Value) {
        let _ = default;
        ignored::<Self>("default_value");
    }

    fn configure_text_format(&mut self, format: &str) {
        let _ = format;
        ignored::<Self>("text_format");
    }

    fn configure_show_text(&mut self, show: bool) {
        let _ = show;
        ignored::<Self>("show_text");
    }

    fn configure_advanced(&mut self, advanced: bool) {
        let _ = advanced;
        ignored::<Self>("advanced");
    }

    fn configure_group(&mut self, group: &str) {
        let _ = group;
        ignored::<Self>("group");
    }

    fn configure_immediate_apply(&mut self, immediate: bool) {
        let _ = immediate;
        ignored::<Self>("immediate_apply");
    }

    fn configure_max_history_size(&mut self, max_size: usize) {
        let _ = max_size;
        ignored::<Self>("max_history_size");
    }

    fn configure_on_change(&mut self, listener: ChangeCallback) {
        let _ = listener;
        ignored::<Self>("on_change");
    }
}

/// Fluent setup of a composed value before it is handed to a container.
#[derive(Debug)]
pub struct ValueBuilder<C: Configure> {
    value: C,
}

impl<C: Configure> ValueBuilder<C> {
    pub fn new(value: C) -> Self {
        Self { value }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.value.set_name(name);
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.value.set_tooltip(tooltip);
        self
    }

    pub fn with_edit_mode(mut self, mode: EditMode) -> Self {
        self.value.set_edit_mode(mode);
        self
    }

    pub fn read_only(self) -> Self {
        self.with_edit_mode(EditMode::ReadOnly)
    }

    pub fn view_only(self) -> Self {
        self.with_edit_mode(EditMode::ViewOnly)
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&C::Value) -> Result<C::Value, String> + Send + Sync + 'static,
    {
        self.value.configure_validator(Box::new(validator));
        self
    }

    pub fn with_default_value(mut self, default: C::Value) -> Self {
        self.value.configure_default_value(default);
        self
    }

    pub fn with_text_format(mut self, format: &str) -> Self {
        self.value.configure_text_format(format);
        self
    }

    pub fn show_text(mut self, show: bool) -> Self {
        self.value.configure_show_text(show);
        self
    }

    pub fn advanced(mut self) -> Self {
        self.value.configure_advanced(true);
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.value.configure_group(group);
        self
    }

    pub fn immediate_apply(mut self, immediate: bool) -> Self {
        self.value.configure_immediate_apply(immediate);
        self
    }

    pub fn with_max_history_size(mut self, max_size: usize) -> Self {
        self.value.configure_max_history_size(max_size);
        self
    }

    pub fn with_kind(mut self, kind: WidgetKind) -> Self {
        self.value.widget_hints_mut().kind = kind;
        self
    }

    pub fn with_range(mut self, min: C::Value, max: C::Value) -> Self {
        self.value.widget_hints_mut().range = Some((min, max));
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.value.widget_hints_mut().speed = Some(speed);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value.widget_hints_mut().options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_widget<W: Widget<C::Value> + 'static>(mut self, widget: W) -> Self {
        self.value.install_widget(widget);
        self
    }

    pub fn on_change<F>(mut self, listener: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.value.configure_on_change(Box::new(listener));
        self
    }

    /// The value being configured.
    pub fn get(&mut self) -> &mut C {
        &mut self.value
    }

    /// Hand over the configured value.
    pub fn build(self) -> C {
        self.value
    }

    /// Build and add to `container` under `id`.
    pub fn add_to<'c>(
        self,
        container: &'c mut ValueContainer,
        id: impl Into<String>,
    ) -> &'c mut (dyn ValueControl + 'static) {
        container.add(id, self.value)
    }
}

pub fn make_builder<C: Configure>(value: C) -> ValueBuilder<C> {
    ValueBuilder::new(value)
}

impl<T: BindValue> Configure for SimpleValue<T> {
    type Value = T;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<T> {
        self.hints_mut()
    }

    fn install_widget<W: Widget<T> + 'static>(&mut self, widget: W) {
        self.set_widget(widget);
    }
}

impl<T: BindValue> Configure for MonitoredValue<T> {
    type Value = T;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<T> {
        self.hints_mut()
    }

    fn install_widget<W: Widget<T> + 'static>(&mut self, widget: W) {
        self.set_widget(widget);
    }

    fn configure_on_change(&mut self, listener: ChangeCallback) {
        self.add_simple_change_listener(listener);
    }
}

impl<T: BindValue> Configure for MonitoredValueWithText<T> {
    type Value = T;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<T> {
        self.hints_mut()
    }

    fn install_widget<W: Widget<T> + 'static>(&mut self, widget: W) {
        self.set_widget(widget);
    }

    fn configure_text_format(&mut self, format: &str) {
        self.set_text_format(format);
    }

    fn configure_show_text(&mut self, show: bool) {
        self.set_show_text(show);
    }

    fn configure_on_change(&mut self, listener: ChangeCallback) {
        self.add_simple_change_listener(listener);
    }
}

impl<T: BindValue> Configure for ConfigValue<T> {
    type Value = T;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<T> {
        self.hints_mut()
    }

    fn install_widget<W: Widget<T> + 'static>(&mut self, widget: W) {
        self.set_widget(widget);
    }

    fn configure_validator(&mut self, validator: Validator<T>) {
        self.set_validator(validator);
    }

    fn configure_default_value(&mut self, default: T) {
        self.set_default_value(default);
    }

    fn configure_advanced(&mut self, advanced: bool) {
        self.set_advanced(advanced);
    }

    fn configure_group(&mut self, group: &str) {
        self.set_group(group);
    }

    fn configure_immediate_apply(&mut self, immediate: bool) {
        self.set_immediate_apply(immediate);
    }
}

impl<T: BindValue> Configure for FullValue<T> {
    type Value = T;

    fn widget_hints_mut(&mut self) -> &mut WidgetHints<T> {
        self.hints_mut()
    }

    fn install_widget<W: Widget<T> + 'static>(&mut self, widget: W) {
        self.set_widget(widget);
    }

    fn configure_validator(&mut self, validator: Validator<T>) {
        self.set_validator(validator);
    }

    fn configure_default_value(&mut self, default: T) {
        self.set_default_value(default);
    }

    fn configure_text_format(&mut self, format: &str) {
        self.set_text_format(format);
    }

    fn configure_show_text(&mut self, show: bool) {
        self.set_show_text(show);
    }

    fn configure_advanced(&mut self, advanced: bool) {
        self.set_advanced(advanced);
    }

    fn configure_group(&mut self, group: &str) {
        self.set_group(group);
    }

    fn configure_immediate_apply(&mut self, immediate: bool) {
        self.set_immediate_apply(immediate);
    }

    fn configure_max_history_size(&mut self, max_size: usize) {
        self.set_max_history_size(max_size);
    }

    fn configure_on_change(&mut self, listener: ChangeCallback) {
        self.add_simple_change_listener(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Historical;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_common_setters_apply_everywhere() {
        let value = make_builder(SimpleValue::new(1.0f32))
            .with_name("Speed")
            .with_tooltip("Units per second")
            .view_only()
            .with_kind(WidgetKind::Drag)
            .with_speed(0.1)
            .build();

        assert_eq!(value.name(), "Speed");
        assert_eq!(value.tooltip(), "Units per second");
        assert_eq!(value.edit_mode(), EditMode::ViewOnly);
        assert_eq!(value.hints().kind, WidgetKind::Drag);
        assert_eq!(value.hints().speed, Some(0.1));
    }

    #[test]
    fn test_config_options() {
        let mut value = make_builder(ConfigValue::new(10))
            .with_validator(|v: &i32| if *v > 0 { Ok(*v) } else { Err("must be positive".into()) })
            .with_default_value(5)
            .advanced()
            .in_group("Audio")
            .immediate_apply(true)
            .with_options(["a", "b"])
            .build();

        assert!(value.try_set(-1).is_err());
        assert_eq!(*value.default_value(), 5);
        assert!(value.is_advanced());
        assert_eq!(value.group(), "Audio");
        assert!(value.is_immediate_apply());
        assert_eq!(value.hints().options.len(), 2);
    }

    #[test]
    fn test_unsupported_options_are_ignored() {
        let value = make_builder(MonitoredValue::new(3))
            .with_validator(|_: &i32| Err("never".into()))
            .with_default_value(9)
            .advanced()
            .with_max_history_size(2)
            .build();

        assert!(value.set(4));
        assert_eq!(value.get(), 4);
    }

    #[test]
    fn test_on_change_and_history() {
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        let value = make_builder(FullValue::new(0))
            .with_max_history_size(2)
            .on_change(move || *h.lock() += 1)
            .build();

        value.set(1).unwrap();
        value.set(2).unwrap();
        value.set(3).unwrap();
        assert_eq!(*hits.lock(), 3);
        assert_eq!(value.history_size(), 2);
        assert_eq!(value.max_history_size(), 2);
    }

    #[test]
    fn test_text_options() {
        let value = make_builder(MonitoredValueWithText::new(0.5f32))
            .with_text_format("%.1f")
            .show_text(true)
            .build();
        assert_eq!(value.text_representation(), "0.5");
    }

    #[test]
    fn test_add_to_container() {
        let mut container = ValueContainer::new();
        make_builder(ConfigValue::new(true))
            .with_name("Enabled")
            .add_to(&mut container, "enabled");

        assert_eq!(container.control("enabled").unwrap().name(), "Enabled");
    }
}
