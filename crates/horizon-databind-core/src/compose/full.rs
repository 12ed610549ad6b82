//! The composition carrying every policy.

use std::any::type_name;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use super::handle::{SharedValue, ValueHandle};
use crate::capability::{
    Capabilities, CapabilityMut, CapabilityRef, CustomCallbacks, DeferredUpdate, ExternalSync,
    Historical, ImmediateApply, StringConvertible, TextRepresentation, Validatable, ValueControl,
    VisibilityControl,
};
use crate::cell::{BindValue, EditMode, ValueCell, ValueHost};
use crate::error::{BindError, Result, ValidationResult};
use crate::logging::targets;
use crate::policy::{
    CallbacksPolicy, ChangeNotificationPolicy, ContextMenuCallback, DefaultValuePolicy,
    DeferredUpdatePolicy, ExternalSyncPolicy, HistoryPolicy, SourceTrackingPolicy,
    TextRepresentationPolicy, ThreadSafetyPolicy, TooltipCallback, ValidationPolicy, ValueSource,
    VisibilityPolicy,
};
use crate::signal::ConnectionId;
use crate::text::TextValue;
use crate::widget::{DrawContext, Widget, WidgetHints, WidgetSlot};

#[derive(Debug)]
struct FullState<T: BindValue> {
    cell: ValueCell<T>,
    deferred: DeferredUpdatePolicy<T>,
    default: DefaultValuePolicy<T>,
    validation: ValidationPolicy<T>,
    history: HistoryPolicy<T>,
    source: SourceTrackingPolicy,
    visibility: VisibilityPolicy,
    text: TextRepresentationPolicy,
    callbacks: CallbacksPolicy,
    immediate: bool,
    edited: bool,
}

impl<T: BindValue> FullState<T> {
    fn has_pending(&self) -> bool {
        self.deferred.has_pending_changes(self.cell.value())
    }

    fn validated(&mut self, candidate: &T) -> Result<T> {
        match self.validation.validate(candidate) {
            Ok(accepted) => {
                self.validation.clear_error();
                Ok(accepted)
            }
            Err(message) => {
                self.validation.record_error(message.clone());
                Err(BindError::Validation { message })
            }
        }
    }

    /// Commit `value`, record it in history and tag its source.
    /// Returns the old value when the committed value changed.
    fn commit_from(&mut self, value: T, source: ValueSource) -> Option<T> {
        if *self.cell.value() == value {
            return None;
        }
        let old = self.cell.replace(value.clone());
        self.cell.mark_changed();
        self.history.push_history(value);
        self.source.set_source(source);
        Some(old)
    }
}

impl<T: BindValue> ValueHost<T> for FullState<T> {
    fn current(&self) -> &T {
        self.cell.value()
    }

    fn commit(&mut self, value: T) {
        self.cell.assign(value);
    }

    fn has_unapplied_edits(&self) -> bool {
        self.has_pending()
    }

    fn record_source(&mut self, source: ValueSource) {
        self.source.set_source(source);
    }
}

#[derive(Debug)]
pub(crate) struct FullShared<T: BindValue> {
    state: ThreadSafetyPolicy<FullState<T>>,
    sync: RwLock<ExternalSyncPolicy<T>>,
    push_serial: ReentrantMutex<()>,
    listeners: ChangeNotificationPolicy<T>,
}

impl<T: BindValue> FullShared<T> {
    fn sync_policy(&self) -> ExternalSyncPolicy<T> {
        self.sync.read().clone()
    }

    /// Notify, then push to the external side. Runs with no lock held.
    fn committed(&self, old: T, new: T) {
        tracing::trace!(target: targets::COMPOSE, ?old, ?new, "full value committed");
        self.listeners.notify_change(old, new);
        self.push_committed();
    }

    /// Push the value committed when the push starts. Pushes are serialized,
    /// so the last one to finish carries the latest value.
    fn push_committed(&self) -> bool {
        let sync = self.sync_policy();
        let _serial = self.push_serial.lock();
        let current = self.state.read_lock().cell.value().clone();
        sync.push(&current)
    }

    fn set(&self, candidate: T) -> Result<bool> {
        let old = {
            let mut state = self.state.write_lock();
            let accepted = state.validated(&candidate)?;
            state.commit_from(accepted.clone(), ValueSource::User).map(|old| (old, accepted))
        };
        match old {
            Some((old, new)) => {
                self.committed(old, new);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn stage(&self, candidate: T) -> Result<()> {
        let mut state = self.state.write_lock();
        let accepted = state.validated(&candidate)?;
        state.deferred.set_pending_value(accepted);
        state.source.set_source(ValueSource::User);
        Ok(())
    }

    fn apply(&self) -> bool {
        let (old, new) = {
            let mut state = self.state.write_lock();
            if !state.has_pending() {
                return false;
            }
            let FullState { cell, deferred, .. } = &mut *state;
            let old = cell.value().clone();
            deferred.apply_changes(cell);
            let new = state.cell.value().clone();
            state.history.push_history(new.clone());
            (old, new)
        };
        self.committed(old, new);
        true
    }

    fn step(&self, forward: bool) -> Option<T> {
        let (old, new) = {
            let mut state = self.state.write_lock();
            let FullState {
                cell,
                history,
                source,
                ..
            } = &mut *state;
            let old = cell.value().clone();
            let new = if forward {
                history.redo(cell)?
            } else {
                history.undo(cell)?
            };
            source.set_source(ValueSource::User);
            (old, new)
        };
        self.committed(old, new.clone());
        Some(new)
    }

    fn pull(&self) -> bool {
        let sync = self.sync_policy();
        if !sync.accepts_pull(&*self.state.read_lock()) {
            return false;
        }
        let Some(value) = sync.pull() else {
            return false;
        };
        let old = {
            let mut state = self.state.write_lock();
            let old = ExternalSyncPolicy::commit_pulled(&mut *state, value.clone());
            if old.is_some() {
                state.history.push_history(value.clone());
            }
            old
        };
        match old {
            Some(old) => {
                self.listeners.notify_change(old, value);
                true
            }
            None => false,
        }
    }

    fn reset(&self) -> bool {
        let old = {
            let mut state = self.state.write_lock();
            state.deferred.revert_changes();
            let default = state.default.default_value().clone();
            state.commit_from(default.clone(), ValueSource::Default).map(|old| (old, default))
        };
        match old {
            Some((old, new)) => {
                self.committed(old, new);
                true
            }
            None => false,
        }
    }

    fn load(&self, text: &str) -> Result<()> {
        let parsed = T::from_text(text).ok_or_else(|| BindError::parse::<T>(text))?;
        let old = {
            let mut state = self.state.write_lock();
            let accepted = state.validated(&parsed)?;
            state.deferred.revert_changes();
            let old = state.commit_from(accepted.clone(), ValueSource::Config);
            // An unchanged load still counts as loaded configuration.
            state.source.set_source(ValueSource::Config);
            old.map(|old| (old, accepted))
        };
        if let Some((old, new)) = old {
            self.committed(old, new);
        }
        Ok(())
    }
}

impl<T: BindValue> SharedValue<T> for FullShared<T> {
    fn get(&self) -> T {
        self.state.read_lock().cell.value().clone()
    }

    fn set(&self, value: T) -> bool {
        FullShared::set(self, value).unwrap_or(false)
    }

    fn sync_from_external(&self) -> bool {
        self.pull()
    }

    fn last_source(&self) -> ValueSource {
        self.state.read_lock().source.last_source()
    }
}

/// A thread-safe value with every capability.
///
/// Edits are staged with [`set_with_validation`](Self::set_with_validation)
/// and committed with [`apply_with_history`](Self::apply_with_history), which
/// records history, notifies listeners and pushes to the external setter.
/// [`set`](Self::set) commits a validated value in one step.
///
/// ```
/// use horizon_databind_core::FullValue;
///
/// let value = FullValue::new("initial".to_string());
/// value.set_with_validation("short".to_string()).unwrap();
/// value.apply_with_history();
///
/// assert_eq!(value.undo().as_deref(), Some("initial"));
/// assert_eq!(value.redo().as_deref(), Some("short"));
/// ```
#[derive(Debug)]
pub struct FullValue<T: BindValue> {
    shared: Arc<FullShared<T>>,
    widget: WidgetSlot<T>,
    hints: WidgetHints<T>,
}

impl<T: BindValue> FullValue<T> {
    pub const CAPABILITIES: Capabilities = Capabilities::all();

    /// Create a value whose initial and default value is `default`. The
    /// default is the first history entry.
    pub fn new(default: T) -> Self {
        let mut history = HistoryPolicy::new();
        history.push_history(default.clone());
        Self {
            shared: Arc::new(FullShared {
                state: ThreadSafetyPolicy::new(FullState {
                    cell: ValueCell::new(default.clone()),
                    deferred: DeferredUpdatePolicy::new(),
                    default: DefaultValuePolicy::new(default),
                    validation: ValidationPolicy::new(),
                    history,
                    source: SourceTrackingPolicy::new(),
                    visibility: VisibilityPolicy::new(),
                    text: TextRepresentationPolicy::new(),
                    callbacks: CallbacksPolicy::new(),
                    immediate: false,
                    edited: false,
                }),
                sync: RwLock::new(ExternalSyncPolicy::new()),
                push_serial: ReentrantMutex::new(()),
                listeners: ChangeNotificationPolicy::new(),
            }),
            widget: WidgetSlot::default(),
            hints: WidgetHints::default(),
        }
    }

    /// Thread-safe read of the committed value.
    pub fn get(&self) -> T {
        SharedValue::get(&*self.shared)
    }

    /// Validate and commit in one step. `Ok(false)` when the accepted value
    /// equals the committed one.
    pub fn set(&self, value: T) -> Result<bool> {
        self.shared.set(value)
    }

    /// Validate and stage. Listeners are not notified until the edit is applied.
    pub fn set_with_validation(&self, value: T) -> Result<()> {
        self.shared.stage(value)
    }

    /// Commit the staged value, record it in history, notify and push to
    /// the external setter. Returns whether anything was committed.
    pub fn apply_with_history(&self) -> bool {
        self.shared.apply()
    }

    pub fn pending_value(&self) -> Option<T> {
        self.shared.state.read_lock().deferred.pending_value().cloned()
    }

    pub fn undo(&self) -> Option<T> {
        self.shared.step(false)
    }

    pub fn redo(&self) -> Option<T> {
        self.shared.step(true)
    }

    pub fn set_max_history_size(&self, max_size: usize) {
        self.shared.state.write_lock().history.set_max_history_size(max_size);
    }

    pub fn max_history_size(&self) -> usize {
        self.shared.state.read_lock().history.max_history_size()
    }

    pub fn set_validator<F>(&self, validator: F)
    where
        F: Fn(&T) -> ValidationResult<T> + Send + Sync + 'static,
    {
        self.shared.state.write_lock().validation.set_validator(validator);
    }

    /// Message from the last rejected edit, empty if none.
    pub fn error(&self) -> String {
        self.shared.state.read_lock().validation.last_error().to_string()
    }

    pub fn default_value(&self) -> T {
        self.shared.state.read_lock().default.default_value().clone()
    }

    pub fn set_default_value(&self, default: T) {
        self.shared.state.write_lock().default.set_default_value(default);
    }

    pub fn reset_to_default(&self) -> bool {
        self.shared.reset()
    }

    /// Parse, validate and commit `text`, tagging it as loaded configuration.
    pub fn load_str(&self, text: &str) -> Result<()> {
        self.shared.load(text)
    }

    pub fn last_source(&self) -> ValueSource {
        SharedValue::last_source(&*self.shared)
    }

    pub fn set_getter<G>(&self, getter: G)
    where
        G: Fn() -> T + Send + Sync + 'static,
    {
        self.shared.sync.write().set_getter(getter);
    }

    pub fn set_setter<S>(&self, setter: S)
    where
        S: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.sync.write().set_setter(setter);
    }

    pub fn add_change_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.shared.listeners.add_change_listener(listener)
    }

    pub fn add_simple_change_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.listeners.add_simple_change_listener(listener)
    }

    pub fn remove_change_listener(&self, id: ConnectionId) -> bool {
        self.shared.listeners.remove_listener(id)
    }

    pub fn clear_change_listeners(&self) {
        self.shared.listeners.clear_change_listeners();
    }

    /// A non-owning handle usable from other threads.
    pub fn handle(&self) -> ValueHandle<T> {
        let shared: Arc<dyn SharedValue<T>> = self.shared.clone();
        ValueHandle::new(&shared)
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

impl<T: BindValue + Default> Default for FullValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BindValue> DeferredUpdate for FullValue<T> {
    fn apply_changes(&mut self) -> bool {
        self.apply_with_history()
    }

    fn revert_changes(&mut self) {
        self.shared.state.write_lock().deferred.revert_changes();
    }

    fn has_pending_changes(&self) -> bool {
        self.shared.state.read_lock().has_pending()
    }

    fn is_dirty(&self) -> bool {
        self.shared.state.read_lock().deferred.is_dirty()
    }
}

impl<T: BindValue> ExternalSync for FullValue<T> {
    fn sync_from_external(&mut self) -> bool {
        self.shared.pull()
    }

    fn sync_to_external(&mut self) -> bool {
        self.shared.push_committed()
    }

    fn is_externally_synced(&self) -> bool {
        self.shared.sync.read().is_externally_synced()
    }
}

impl<T: BindValue> Validatable for FullValue<T> {
    fn validate(&mut self) -> bool {
        let mut state = self.shared.state.write_lock();
        let FullState {
            cell, validation, ..
        } = &mut *state;
        validation.check(cell.value())
    }

    fn is_valid(&self) -> bool {
        self.shared.state.read_lock().validation.is_valid()
    }

    fn validation_error(&self) -> String {
        self.error()
    }
}

impl<T: BindValue> Historical for FullValue<T> {
    fn can_undo(&self) -> bool {
        self.shared.state.read_lock().history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.shared.state.read_lock().history.can_redo()
    }

    fn undo(&mut self) -> bool {
        self.shared.step(false).is_some()
    }

    fn redo(&mut self) -> bool {
        self.shared.step(true).is_some()
    }

    fn clear_history(&mut self) {
        self.shared.state.write_lock().history.clear_history();
    }

    fn history_size(&self) -> usize {
        self.shared.state.read_lock().history.history_size()
    }
}

impl<T: BindValue> VisibilityControl for FullValue<T> {
    fn is_visible(&self) -> bool {
        self.shared.state.read_lock().visibility.is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.shared.state.write_lock().visibility.set_visible(visible);
    }

    fn is_advanced(&self) -> bool {
        self.shared.state.read_lock().visibility.is_advanced()
    }

    fn set_advanced(&mut self, advanced: bool) {
        self.shared.state.write_lock().visibility.set_advanced(advanced);
    }

    fn group(&self) -> String {
        self.shared.state.read_lock().visibility.group().to_string()
    }

    fn set_group(&mut self, group: &str) {
        self.shared.state.write_lock().visibility.set_group(group);
    }
}

impl<T: BindValue> StringConvertible for FullValue<T> {
    fn as_string(&self) -> String {
        self.shared.state.read_lock().cell.value().to_text(None)
    }

    fn set_from_string(&mut self, text: &str) -> bool {
        self.load_str(text).is_ok()
    }
}

impl<T: BindValue> TextRepresentation for FullValue<T> {
    fn show_text(&self) -> bool {
        self.shared.state.read_lock().text.show_text()
    }

    fn set_show_text(&mut self, show: bool) {
        self.shared.state.write_lock().text.set_show_text(show);
    }

    fn text_format(&self) -> Option<String> {
        self.shared.state.read_lock().text.text_format().map(str::to_string)
    }

    fn set_text_format(&mut self, format: &str) {
        self.shared.state.write_lock().text.set_text_format(format);
    }

    fn text_representation(&self) -> String {
        let state = self.shared.state.read_lock();
        state.text.render(state.cell.value())
    }
}

impl<T: BindValue> CustomCallbacks for FullValue<T> {
    fn set_tooltip_callback(&mut self, callback: TooltipCallback) {
        self.shared.state.write_lock().callbacks.set_tooltip_callback(callback);
    }

    fn set_context_menu_callback(&mut self, callback: ContextMenuCallback) {
        self.shared.state.write_lock().callbacks.set_context_menu_callback(callback);
    }

    fn has_tooltip_callback(&self) -> bool {
        self.shared.state.read_lock().callbacks.has_tooltip_callback()
    }

    fn has_context_menu_callback(&self) -> bool {
        self.shared.state.read_lock().callbacks.has_context_menu_callback()
    }
}

impl<T: BindValue> ImmediateApply for FullValue<T> {
    fn is_immediate_apply(&self) -> bool {
        self.shared.state.read_lock().immediate
    }

    fn set_immediate_apply(&mut self, immediate: bool) {
        self.shared.state.write_lock().immediate = immediate;
    }
}

impl<T: BindValue> ValueControl for FullValue<T> {
    fn name(&self) -> String {
        self.shared.state.read_lock().cell.name().to_string()
    }

    fn set_name(&mut self, name: &str) {
        self.shared.state.write_lock().cell.set_name(name);
    }

    fn tooltip(&self) -> String {
        self.shared.state.read_lock().cell.tooltip().to_string()
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.shared.state.write_lock().cell.set_tooltip(tooltip);
    }

    fn edit_mode(&self) -> EditMode {
        self.shared.state.read_lock().cell.edit_mode()
    }

    fn set_edit_mode(&mut self, mode: EditMode) {
        self.shared.state.write_lock().cell.set_edit_mode(mode);
    }

    fn draw(&mut self, label: &str) -> bool {
        let (mut scratch, edit_mode, tooltip, error, text, has_pending, callbacks, immediate) = {
            let state = self.shared.state.read_lock();
            let text = state
                .text
                .show_text()
                .then(|| state.text.render(state.cell.value()));
            (
                state
                    .deferred
                    .pending_value()
                    .unwrap_or_else(|| state.cell.value())
                    .clone(),
                state.cell.edit_mode(),
                state.cell.tooltip().to_string(),
                state.validation.last_error().to_string(),
                text,
                state.has_pending(),
                state.callbacks.clone(),
                state.immediate,
            )
        };

        let response = self.widget.draw(DrawContext {
            label,
            value: &mut scratch,
            edit_mode,
            tooltip: &tooltip,
            hints: &self.hints,
            has_pending,
            error: &error,
            text: text.as_deref(),
        });
        callbacks.dispatch(response.hovered, response.context_menu_requested);

        if !response.changed || edit_mode != EditMode::Editable || self.shared.stage(scratch).is_err()
        {
            return false;
        }
        self.shared.state.write_lock().edited = true;
        if immediate {
            self.shared.apply();
        }
        true
    }

    fn is_changed(&self) -> bool {
        let state = self.shared.state.read_lock();
        state.cell.is_changed() || state.edited
    }

    fn clear_changed(&mut self) {
        let mut state = self.shared.state.write_lock();
        state.cell.clear_changed();
        state.edited = false;
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
            f if f == Capabilities::EXTERNAL_SYNC => CapabilityRef::ExternalSync(self),
            f if f == Capabilities::VALIDATION => CapabilityRef::Validation(self),
            f if f == Capabilities::HISTORY => CapabilityRef::History(self),
            f if f == Capabilities::VISIBILITY => CapabilityRef::Visibility(self),
            f if f == Capabilities::STRING_CONVERSION => CapabilityRef::StringConversion(self),
            f if f == Capabilities::TEXT_REPRESENTATION => CapabilityRef::TextRepresentation(self),
            f if f == Capabilities::CUSTOM_CALLBACKS => CapabilityRef::CustomCallbacks(self),
            f if f == Capabilities::IMMEDIATE_APPLY => CapabilityRef::ImmediateApply(self),
            _ => return None,
        })
    }

    fn capability_mut(&mut self, flag: Capabilities) -> Option<CapabilityMut<'_>> {
        Some(match flag {
            f if f == Capabilities::DEFERRED_UPDATE => CapabilityMut::DeferredUpdate(self),
            f if f == Capabilities::EXTERNAL_SYNC => CapabilityMut::ExternalSync(self),
            f if f == Capabilities::VALIDATION => CapabilityMut::Validation(self),
            f if f == Capabilities::HISTORY => CapabilityMut::History(self),
            f if f == Capabilities::VISIBILITY => CapabilityMut::Visibility(self),
            f if f == Capabilities::STRING_CONVERSION => CapabilityMut::StringConversion(self),
            f if f == Capabilities::TEXT_REPRESENTATION => CapabilityMut::TextRepresentation(self),
            f if f == Capabilities::CUSTOM_CALLBACKS => CapabilityMut::CustomCallbacks(self),
            f if f == Capabilities::IMMEDIATE_APPLY => CapabilityMut::ImmediateApply(self),
            _ => return None,
        })
    }
}

static_assertions::assert_impl_all!(FullValue<String>: Send, Sync);
