//! Configuration values: staged, validated, resettable.

use std::any::type_name;

use super::TrackedHost;
use crate::capability::{
    Capabilities, CapabilityMut, CapabilityRef, DeferredUpdate, ImmediateApply,
    StringConvertible, Validatable, ValueControl, VisibilityControl,
};
use crate::cell::{BindValue, EditMode, ValueCell};
use crate::error::{BindError, Result, ValidationResult};
use crate::logging::targets;
use crate::policy::{
    DefaultValuePolicy, DeferredUpdatePolicy, SourceTrackingPolicy, ValidationPolicy, ValueSource,
    VisibilityPolicy,
};
use crate::text::TextValue;
use crate::widget::{DrawContext, Widget, WidgetHints, WidgetSlot};

/// A value edited through a staged, validated workflow.
///
/// Edits are validated by [`try_set`](Self::try_set) and staged; they take
/// effect on [`apply_changes`](DeferredUpdate::apply_changes), unless
/// immediate apply is on. Single-threaded.
///
/// ```
/// use horizon_databind_core::{ConfigValue, DeferredUpdate};
///
/// let mut port = ConfigValue::new(8080u16);
/// port.set_validator(|p| if *p >= 1024 { Ok(*p) } else { Err("Reserved port".into()) });
///
/// assert!(port.try_set(80).is_err());
/// assert_eq!(port.error(), "Reserved port");
///
/// port.try_set(9000).unwrap();
/// assert_eq!(*port.value(), 8080);
/// port.apply_changes();
/// assert_eq!(*port.value(), 9000);
/// ```
#[derive(Debug)]
pub struct ConfigValue<T: BindValue> {
    cell: ValueCell<T>,
    deferred: DeferredUpdatePolicy<T>,
    default: DefaultValuePolicy<T>,
    validation: ValidationPolicy<T>,
    source: SourceTrackingPolicy,
    visibility: VisibilityPolicy,
    immediate: bool,
    /// An edit was staged through `draw` since the last `clear_changed`.
    edited: bool,
    widget: WidgetSlot<T>,
    hints: WidgetHints<T>,
}

impl<T: BindValue> ConfigValue<T> {
    pub const CAPABILITIES: Capabilities = Capabilities::DEFERRED_UPDATE
        .union(Capabilities::VALIDATION)
        .union(Capabilities::VISIBILITY)
        .union(Capabilities::STRING_CONVERSION)
        .union(Capabilities::IMMEDIATE_APPLY);

    /// Create a value whose initial and default value is `default`.
    pub fn new(default: T) -> Self {
        Self {
            cell: ValueCell::new(default.clone()),
            deferred: DeferredUpdatePolicy::new(),
            default: DefaultValuePolicy::new(default),
            validation: ValidationPolicy::new(),
            source: SourceTrackingPolicy::new(),
            visibility: VisibilityPolicy::new(),
            immediate: false,
            edited: false,
            widget: WidgetSlot::default(),
            hints: WidgetHints::default(),
        }
    }

    /// The committed value.
    pub fn value(&self) -> &T {
        self.cell.value()
    }

    /// Unsynchronized access to the underlying cell.
    pub fn cell_mut(&mut self) -> &mut ValueCell<T> {
        &mut self.cell
    }

    pub fn pending_value(&self) -> Option<&T> {
        self.deferred.pending_value()
    }

    /// The staged value if any, else the committed one.
    pub fn effective_value(&self) -> &T {
        self.deferred.pending_value().unwrap_or_else(|| self.cell.value())
    }

    /// Stage `value` without validation.
    pub fn set_pending_value(&mut self, value: T) {
        self.deferred.set_pending_value(value);
    }

    /// Validate `candidate` and stage the accepted value.
    ///
    /// On rejection nothing is staged and the message is kept for
    /// [`error`](Self::error).
    pub fn try_set(&mut self, candidate: T) -> Result<()> {
        match self.validation.validate(&candidate) {
            Ok(accepted) => {
                self.deferred.set_pending_value(accepted);
                self.source.set_source(ValueSource::User);
                self.validation.clear_error();
                Ok(())
            }
            Err(message) => {
                self.validation.record_error(message.clone());
                Err(BindError::Validation { message })
            }
        }
    }

    /// Message from the last rejected edit, empty if the last one was accepted.
    pub fn error(&self) -> &str {
        self.validation.last_error()
    }

    pub fn set_validator<F>(&mut self, validator: F)
    where
        F: Fn(&T) -> ValidationResult<T> + Send + Sync + 'static,
    {
        self.validation.set_validator(validator);
    }

    pub fn default_value(&self) -> &T {
        self.default.default_value()
    }

    pub fn set_default_value(&mut self, default: T) {
        self.default.set_default_value(default);
    }

    /// Commit the default, discarding anything staged.
    pub fn reset_to_default(&mut self) -> bool {
        self.deferred.revert_changes();
        self.default
            .reset_to_default(&mut TrackedHost::new(&mut self.cell, &mut self.source))
            .is_some()
    }

    pub fn last_source(&self) -> ValueSource {
        self.source.last_source()
    }

    /// Parse, validate and commit `text` directly, tagging it as loaded
    /// configuration. Anything staged is discarded.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let parsed = T::from_text(text).ok_or_else(|| BindError::parse::<T>(text))?;
        let accepted = self.validation.validate(&parsed).map_err(|message| {
            self.validation.record_error(message.clone());
            BindError::Validation { message }
        })?;
        self.deferred.revert_changes();
        self.cell.assign(accepted);
        self.source.set_source(ValueSource::Config);
        self.validation.clear_error();
        tracing::trace!(target: targets::COMPOSE, text, "loaded value from text");
        Ok(())
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

    fn has_pending(&self) -> bool {
        self.deferred.has_pending_changes(self.cell.value())
    }
}

impl<T: BindValue + Default> Default for ConfigValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BindValue> DeferredUpdate for ConfigValue<T> {
    fn apply_changes(&mut self) -> bool {
        self.deferred.apply_changes(&mut self.cell)
    }

    fn revert_changes(&mut self) {
        self.deferred.revert_changes();
    }

    fn has_pending_changes(&self) -> bool {
        self.has_pending()
    }

    fn is_dirty(&self) -> bool {
        self.deferred.is_dirty()
    }
}

impl<T: BindValue> Validatable for ConfigValue<T> {
    fn validate(&mut self) -> bool {
        self.validation.check(self.cell.value())
    }

    fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    fn validation_error(&self) -> String {
        self.validation.last_error().to_string()
    }
}

impl<T: BindValue> VisibilityControl for ConfigValue<T> {
    fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visibility.set_visible(visible);
    }

    fn is_advanced(&self) -> bool {
        self.visibility.is_advanced()
    }

    fn set_advanced(&mut self, advanced: bool) {
        self.visibility.set_advanced(advanced);
    }

    fn group(&self) -> String {
        self.visibility.group().to_string()
    }

    fn set_group(&mut self, group: &str) {
        self.visibility.set_group(group);
    }
}

impl<T: BindValue> StringConvertible for ConfigValue<T> {
    fn as_string(&self) -> String {
        self.cell.value().to_text(None)
    }

    fn set_from_string(&mut self, text: &str) -> bool {
        self.load_str(text).is_ok()
    }
}

impl<T: BindValue> ImmediateApply for ConfigValue<T> {
    fn is_immediate_apply(&self) -> bool {
        self.immediate
    }

    fn set_immediate_apply(&mut self, immediate: bool) {
        self.immediate = immediate;
    }
}

impl<T: BindValue> ValueControl for ConfigValue<T> {
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
        let mut scratch = self.effective_value().clone();
        let has_pending = self.has_pending();
        let response = self.widget.draw(DrawContext {
            label,
            value: &mut scratch,
            edit_mode: self.cell.edit_mode(),
            tooltip: self.cell.tooltip(),
            hints: &self.hints,
            has_pending,
            error: self.validation.last_error(),
            text: None,
        });
        if !response.changed || !self.cell.is_editable() || self.try_set(scratch).is_err() {
            return false;
        }
        self.edited = true;
        if self.immediate {
            self.apply_changes();
        }
        true
    }

    fn is_changed(&self) -> bool {
        self.cell.is_changed() || self.edited
    }

    fn clear_changed(&mut self) {
        self.cell.clear_changed();
        self.edited = false;
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn capability(&self, flag: Capabilities) -> Option<CapabilityRef<'_>> {
        Some(match flag {
            f if f == Capabilities::DEFERRED_UPDATE => CapabilityRef::DeferredUpdate(self),
            f if f == Capabilities::VALIDATION => CapabilityRef::Validation(self),
            f if f == Capabilities::VISIBILITY => CapabilityRef::Visibility(self),
            f if f == Capabilities::STRING_CONVERSION => CapabilityRef::StringConversion(self),
            f if f == Capabilities::IMMEDIATE_APPLY => CapabilityRef::ImmediateApply(self),
            _ => return None,
        })
    }

    fn capability_mut(&mut self, flag: Capabilities) -> Option<CapabilityMut<'_>> {
        Some(match flag {
            f if f == Capabilities::DEFERRED_UPDATE => CapabilityMut::DeferredUpdate(self),
            f if f == Capabilities::VALIDATION => CapabilityMut::Validation(self),
            f if f == Capabilities::VISIBILITY => CapabilityMut::Visibility(self),
            f if f == Capabilities::STRING_CONVERSION => CapabilityMut::StringConversion(self),
            f if f == Capabilities::IMMEDIATE_APPLY => CapabilityMut::ImmediateApply(self),
            _ => return None,
        })
    }
}

static_assertions::assert_impl_all!(ConfigValue<i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ExternalSync, Historical};
    use crate::widget::{widget_fn, Response};

    fn positive(default: i32) -> ConfigValue<i32> {
        let mut value = ConfigValue::new(default);
        value.set_validator(|v| {
            if *v > 0 {
                Ok(*v)
            } else {
                Err("Value must be positive".to_string())
            }
        });
        value
    }

    #[test]
    fn test_try_set_stages_and_rejects() {
        let mut value = positive(10);

        assert!(value.try_set(20).is_ok());
        assert!(value.has_pending_changes());
        assert_eq!(value.last_source(), ValueSource::User);

        let err = value.try_set(-5).unwrap_err();
        assert_eq!(err, BindError::validation("Value must be positive"));
        assert_eq!(*value.value(), 10);
        assert_eq!(value.pending_value(), Some(&20));
        assert!(!value.error().is_empty());

        assert!(value.apply_changes());
        assert_eq!(*value.value(), 20);
        assert!(!value.has_pending_changes());
    }

    #[test]
    fn test_set_pending_equal_marks_dirty_only() {
        let mut value = ConfigValue::new(4);
        value.set_pending_value(4);
        assert!(value.is_dirty());
        assert!(!value.has_pending_changes());
    }

    #[test]
    fn test_reset_to_default() {
        let mut value = positive(3);
        value.load_str("9").unwrap();
        value.try_set(12).unwrap();

        assert!(value.reset_to_default());
        assert_eq!(*value.value(), 3);
        assert!(!value.has_pending_changes());
        assert_eq!(value.last_source(), ValueSource::Default);
    }

    #[test]
    fn test_string_conversion() {
        let mut value = positive(1);
        value.try_set(5).unwrap();

        assert!(value.set_from_string("42"));
        assert_eq!(*value.value(), 42);
        assert_eq!(value.as_string(), "42");
        assert_eq!(value.last_source(), ValueSource::Config);
        // Loading discards the staged edit.
        assert!(value.pending_value().is_none());

        assert_eq!(value.load_str("abc"), Err(BindError::parse::<i32>("abc")));
        assert!(!value.set_from_string("-1"));
        assert_eq!(*value.value(), 42);
    }

    #[test]
    fn test_draw_stages_edit() {
        let mut value = positive(1);
        value.set_widget(widget_fn(|cx: DrawContext<'_, i32>| {
            *cx.value += 1;
            Response::changed()
        }));

        assert!(value.draw("Count"));
        assert_eq!(*value.value(), 1);
        assert_eq!(value.pending_value(), Some(&2));
        assert!(value.is_changed());

        // The next frame edits the staged value, not the committed one.
        value.clear_changed();
        assert!(value.draw("Count"));
        assert_eq!(value.pending_value(), Some(&3));
    }

    #[test]
    fn test_draw_rejected_edit_reports_no_change() {
        let mut value = positive(1);
        value.set_widget(widget_fn(|cx: DrawContext<'_, i32>| {
            *cx.value = 0;
            Response::changed()
        }));

        assert!(!value.draw("Count"));
        assert!(!value.is_changed());
        assert!(!value.has_pending_changes());
    }

    #[test]
    fn test_immediate_apply_commits_during_draw() {
        let mut value = positive(1);
        value.set_immediate_apply(true);
        value.set_widget(widget_fn(|cx: DrawContext<'_, i32>| {
            *cx.value = 7;
            Response::changed()
        }));

        assert!(value.draw("Count"));
        assert_eq!(*value.value(), 7);
        assert!(!value.has_pending_changes());
    }

    #[test]
    fn test_capability_query() {
        let mut value = positive(1);
        let control: &mut dyn ValueControl = &mut value;

        assert!(control.query_interface::<dyn ExternalSync>().is_none());
        assert!(control.query_interface::<dyn Historical>().is_none());
        assert!(control.query_interface::<dyn Validatable>().is_some());
        assert!(control.query_interface::<dyn VisibilityControl>().is_some());
        assert!(control.query_interface::<dyn ImmediateApply>().is_some());

        let strings = control.query_interface_mut::<dyn StringConvertible>().unwrap();
        assert!(strings.set_from_string("8"));
        assert_eq!(control.downcast_ref::<ConfigValue<i32>>().map(|v| *v.value()), Some(8));
    }
}
