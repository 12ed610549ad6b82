//! Thread-safe values mirrored from an external owner.

use std::any::type_name;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use super::handle::{SharedValue, ValueHandle};
use crate::capability::{
    Capabilities, CapabilityMut, CapabilityRef, ExternalSync, TextRepresentation, ValueControl,
};
use crate::cell::{BindValue, EditMode, ValueCell, ValueHost};
use crate::logging::targets;
use crate::policy::{
    ChangeNotificationPolicy, ExternalSyncPolicy, SourceTrackingPolicy, TextRepresentationPolicy,
    ThreadSafetyPolicy, ValueSource,
};
use crate::signal::ConnectionId;
use crate::widget::{DrawContext, Widget, WidgetHints, WidgetSlot};

#[derive(Debug)]
struct MonitoredState<T> {
    cell: ValueCell<T>,
    source: SourceTrackingPolicy,
}

impl<T: BindValue> ValueHost<T> for MonitoredState<T> {
    fn current(&self) -> &T {
        self.cell.value()
    }

    fn commit(&mut self, value: T) {
        self.cell.assign(value);
    }

    fn record_source(&mut self, source: ValueSource) {
        self.source.set_source(source);
    }
}

/// State shared between a [`MonitoredValue`] and its handles.
#[derive(Debug)]
pub(crate) struct MonitoredShared<T: BindValue> {
    state: ThreadSafetyPolicy<MonitoredState<T>>,
    sync: RwLock<ExternalSyncPolicy<T>>,
    // Serializes setter calls so the external side ends on the latest value.
    push_serial: ReentrantMutex<()>,
    listeners: ChangeNotificationPolicy<T>,
}

impl<T: BindValue> MonitoredShared<T> {
    fn sync_policy(&self) -> ExternalSyncPolicy<T> {
        self.sync.read().clone()
    }

    /// Push whatever is committed when the push starts, not the value that
    /// triggered it. Returns whether a setter ran.
    fn push_committed(&self) -> bool {
        let sync = self.sync_policy();
        let _serial = self.push_serial.lock();
        let current = self.get();
        sync.push(&current)
    }

    fn pull(&self) -> bool {
        let sync = self.sync_policy();
        if !sync.accepts_pull(&*self.state.read_lock()) {
            return false;
        }
        // The getter runs without any lock held.
        let Some(value) = sync.pull() else {
            return false;
        };
        let old = ExternalSyncPolicy::commit_pulled(&mut *self.state.write_lock(), value.clone());
        match old {
            Some(old) => {
                self.listeners.notify_change(old, value);
                true
            }
            None => false,
        }
    }
}

impl<T: BindValue> SharedValue<T> for MonitoredShared<T> {
    fn get(&self) -> T {
        self.state.read_lock().cell.value().clone()
    }

    fn set(&self, value: T) -> bool {
        let old = {
            let mut state = self.state.write_lock();
            if *state.cell.value() == value {
                return false;
            }
            let old = state.cell.value().clone();
            state.cell.assign(value.clone());
            state.source.set_source(ValueSource::User);
            old
        };
        tracing::trace!(target: targets::COMPOSE, ?value, "monitored value set");
        self.listeners.notify_change(old, value);
        self.push_committed();
        true
    }

    fn sync_from_external(&self) -> bool {
        self.pull()
    }

    fn last_source(&self) -> ValueSource {
        self.state.read_lock().source.last_source()
    }
}

/// A value bound to an external owner and safe to read and write from any
/// thread through [`get`](Self::get) and [`set`](Self::set).
///
/// Writes notify listeners and push to the external setter after the lock
/// is released.
#[derive(Debug)]
pub struct MonitoredValue<T: BindValue> {
    shared: Arc<MonitoredShared<T>>,
    widget: WidgetSlot<T>,
    hints: WidgetHints<T>,
}

impl<T: BindValue> MonitoredValue<T> {
    pub const CAPABILITIES: Capabilities = Capabilities::EXTERNAL_SYNC;

    /// Create an unbound value.
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(MonitoredShared {
                state: ThreadSafetyPolicy::new(MonitoredState {
                    cell: ValueCell::new(initial),
                    source: SourceTrackingPolicy::new(),
                }),
                sync: RwLock::new(ExternalSyncPolicy::new()),
                push_serial: ReentrantMutex::new(()),
                listeners: ChangeNotificationPolicy::new(),
            }),
            widget: WidgetSlot::default(),
            hints: WidgetHints::default(),
        }
    }

    /// Create a value bound to `getter`/`setter`, starting at `default` and
    /// immediately pulling the external value.
    pub fn new_bound<G, S>(getter: G, setter: S, default: T) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(&T) + Send + Sync + 'static,
    {
        let value = Self::new(default);
        *value.shared.sync.write() = ExternalSyncPolicy::bound(getter, setter);
        value.shared.pull();
        value
    }

    /// Thread-safe read of the committed value.
    pub fn get(&self) -> T {
        self.shared.get()
    }

    /// Thread-safe write. Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        self.shared.set(value)
    }

    /// Pull from the external getter.
    pub fn refresh(&self) -> bool {
        self.shared.pull()
    }

    pub fn last_source(&self) -> ValueSource {
        self.shared.last_source()
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

    fn draw_with_text(&mut self, label: &str, text: Option<&str>) -> bool {
        let (mut scratch, edit_mode, tooltip) = {
            let state = self.shared.state.read_lock();
            (
                state.cell.value().clone(),
                state.cell.edit_mode(),
                state.cell.tooltip().to_string(),
            )
        };
        let response = self.widget.draw(DrawContext {
            label,
            value: &mut scratch,
            edit_mode,
            tooltip: &tooltip,
            hints: &self.hints,
            has_pending: false,
            error: "",
            text,
        });
        response.changed && edit_mode == EditMode::Editable && self.set(scratch)
    }
}

impl<T: BindValue + Default> Default for MonitoredValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: BindValue> ExternalSync for MonitoredValue<T> {
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

impl<T: BindValue> ValueControl for MonitoredValue<T> {
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
        self.draw_with_text(label, None)
    }

    fn is_changed(&self) -> bool {
        self.shared.state.read_lock().cell.is_changed()
    }

    fn clear_changed(&mut self) {
        self.shared.state.write_lock().cell.clear_changed();
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn capability(&self, flag: Capabilities) -> Option<CapabilityRef<'_>> {
        (flag == Capabilities::EXTERNAL_SYNC).then_some(CapabilityRef::ExternalSync(self))
    }

    fn capability_mut(&mut self, flag: Capabilities) -> Option<CapabilityMut<'_>> {
        (flag == Capabilities::EXTERNAL_SYNC).then_some(CapabilityMut::ExternalSync(self))
    }
}

/// A [`MonitoredValue`] that also shows a formatted text representation.
#[derive(Debug)]
pub struct MonitoredValueWithText<T: BindValue> {
    inner: MonitoredValue<T>,
    text: TextRepresentationPolicy,
}

impl<T: BindValue> MonitoredValueWithText<T> {
    pub const CAPABILITIES: Capabilities =
        Capabilities::EXTERNAL_SYNC.union(Capabilities::TEXT_REPRESENTATION);

    pub fn new(initial: T) -> Self {
        Self::from_monitored(MonitoredValue::new(initial))
    }

    pub fn new_bound<G, S>(getter: G, setter: S, default: T) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(&T) + Send + Sync + 'static,
    {
        Self::from_monitored(MonitoredValue::new_bound(getter, setter, default))
    }

    fn from_monitored(inner: MonitoredValue<T>) -> Self {
        let mut text = TextRepresentationPolicy::new();
        text.set_show_text(true);
        Self { inner, text }
    }

    pub fn text_policy(&self) -> &TextRepresentationPolicy {
        &self.text
    }
}

impl<T: BindValue> Deref for MonitoredValueWithText<T> {
    type Target = MonitoredValue<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: BindValue> DerefMut for MonitoredValueWithText<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T: BindValue> TextRepresentation for MonitoredValueWithText<T> {
    fn show_text(&self) -> bool {
        self.text.show_text()
    }

    fn set_show_text(&mut self, show: bool) {
        self.text.set_show_text(show);
    }

    fn text_format(&self) -> Option<String> {
        self.text.text_format().map(str::to_string)
    }

    fn set_text_format(&mut self, format: &str) {
        self.text.set_text_format(format);
    }

    fn text_representation(&self) -> String {
        self.text.render(&self.inner.get())
    }
}

impl<T: BindValue> ExternalSync for MonitoredValueWithText<T> {
    fn sync_from_external(&mut self) -> bool {
        self.inner.sync_from_external()
    }

    fn sync_to_external(&mut self) -> bool {
        self.inner.sync_to_external()
    }

    fn is_externally_synced(&self) -> bool {
        self.inner.is_externally_synced()
    }
}

impl<T: BindValue> ValueControl for MonitoredValueWithText<T> {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn set_name(&mut self, name: &str) {
        self.inner.set_name(name);
    }

    fn tooltip(&self) -> String {
        self.inner.tooltip()
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.inner.set_tooltip(tooltip);
    }

    fn edit_mode(&self) -> EditMode {
        self.inner.edit_mode()
    }

    fn set_edit_mode(&mut self, mode: EditMode) {
        self.inner.set_edit_mode(mode);
    }

    fn draw(&mut self, label: &str) -> bool {
        let text = self.text.show_text().then(|| self.text_representation());
        self.inner.draw_with_text(label, text.as_deref())
    }

    fn is_changed(&self) -> bool {
        self.inner.is_changed()
    }

    fn clear_changed(&mut self) {
        self.inner.clear_changed();
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn capability(&self, flag: Capabilities) -> Option<CapabilityRef<'_>> {
        if flag == Capabilities::EXTERNAL_SYNC {
            Some(CapabilityRef::ExternalSync(self))
        } else if flag == Capabilities::TEXT_REPRESENTATION {
            Some(CapabilityRef::TextRepresentation(self))
        } else {
            None
        }
    }

    fn capability_mut(&mut self, flag: Capabilities) -> Option<CapabilityMut<'_>> {
        if flag == Capabilities::EXTERNAL_SYNC {
            Some(CapabilityMut::ExternalSync(self))
        } else if flag == Capabilities::TEXT_REPRESENTATION {
            Some(CapabilityMut::TextRepresentation(self))
        } else {
            None
        }
    }
}

static_assertions::assert_impl_all!(MonitoredValue<f32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Historical;
    use crate::widget::{widget_fn, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_bound_value_pulls_on_construction() {
        let value = MonitoredValue::new_bound(|| 7, |_: &i32| {}, 0);
        assert_eq!(value.get(), 7);
        assert_eq!(value.last_source(), ValueSource::External);
    }

    #[test]
    fn test_set_notifies_after_unlock() {
        let value = Arc::new(MonitoredValue::new(1));
        let seen = Arc::new(AtomicUsize::new(0));

        let reader = value.clone();
        let s = seen.clone();
        value.add_change_listener(move |_, new| {
            // Reading the value from a listener must not deadlock.
            assert_eq!(reader.get(), *new);
            s.fetch_add(1, Ordering::SeqCst);
        });

        assert!(value.set(2));
        assert!(!value.set(2));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(value.last_source(), ValueSource::User);
    }

    #[test]
    fn test_draw_sets_through_lock() {
        let pushed = Arc::new(AtomicUsize::new(0));
        let p = pushed.clone();
        let mut value = MonitoredValue::new(0usize);
        value.set_setter(move |v: &usize| p.store(*v, Ordering::SeqCst));
        value.set_widget(widget_fn(|cx: DrawContext<'_, usize>| {
            *cx.value = 9;
            Response::changed()
        }));

        assert!(value.draw("Count"));
        assert_eq!(value.get(), 9);
        assert_eq!(pushed.load(Ordering::SeqCst), 9);
        assert!(value.is_changed());
    }

    #[test]
    fn test_capabilities() {
        let mut value = MonitoredValue::new(false);
        let control: &mut dyn ValueControl = &mut value;
        assert!(control.query_interface::<dyn Historical>().is_none());
        assert!(control.query_interface::<dyn TextRepresentation>().is_none());
        let sync = control.query_interface_mut::<dyn ExternalSync>().unwrap();
        assert!(!sync.is_externally_synced());
        assert!(!sync.sync_from_external());
    }

    #[test]
    fn test_text_variant() {
        let mut value = MonitoredValueWithText::new(0.25f32);
        value.set_text_format("%.0f%%");
        value.set(50.0);
        assert_eq!(value.text_representation(), "50%");

        let texts = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let t = texts.clone();
        value.set_widget(widget_fn(move |cx: DrawContext<'_, f32>| {
            t.lock().push(cx.text.map(str::to_string));
            Response::unchanged()
        }));
        assert!(!value.draw("Progress"));
        assert_eq!(*texts.lock(), vec![Some("50%".to_string())]);

        let control: &dyn ValueControl = &value;
        assert!(control.query_interface::<dyn TextRepresentation>().is_some());
        assert!(control.query_interface::<dyn ExternalSync>().is_some());
    }
}
