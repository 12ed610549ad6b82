//! An ordered, id-keyed registry of heterogeneous bound values.
//!
//! Members are stored type-erased as [`ValueControl`] and drawn in insertion
//! order. Bulk operations ask each member for the capability they need and
//! silently skip members without it.
//!
//! ```
//! use horizon_databind_core::{ConfigValue, SimpleValue, ValueContainer};
//!
//! let mut container = ValueContainer::new();
//! container.add("a", SimpleValue::new(1));
//! container.add("b", ConfigValue::new(10));
//!
//! container.get_mut::<ConfigValue<i32>>("b").unwrap().try_set(20).unwrap();
//! assert!(container.has_pending_changes());
//!
//! assert_eq!(container.apply_all(), 1);
//! assert_eq!(*container.get::<ConfigValue<i32>>("b").unwrap().value(), 20);
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::capability::{Capability, DeferredUpdate, ExternalSync, ValueControl, VisibilityControl};
use crate::cell::EditMode;
use crate::compose::SimpleValue;
use crate::error::{BindError, Result};
use crate::logging::{span_names, targets, PerfSpan};
use crate::signal::{ConnectionId, Signal};
use crate::widget::{WidgetHints, WidgetKind};

new_key_type! {
    /// Internal slot key of a container member.
    struct SlotKey;
}

struct Entry {
    id: String,
    control: Box<dyn ValueControl>,
    type_id: TypeId,
    type_name: &'static str,
}

/// Container-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Title shown by the rendering collaborator and in debug dumps.
    pub name: String,
    /// An invisible container draws nothing.
    pub visible: bool,
    /// Commit and report each member as soon as its draw reports a change.
    pub immediate_apply: bool,
    /// Draw members marked advanced.
    pub show_advanced: bool,
    /// Edit mode forced onto every member before it is drawn.
    pub global_edit_mode: Option<EditMode>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            immediate_apply: false,
            show_advanced: false,
            global_edit_mode: None,
        }
    }
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_immediate_apply(mut self, immediate: bool) -> Self {
        self.immediate_apply = immediate;
        self
    }

    pub fn with_show_advanced(mut self, show: bool) -> Self {
        self.show_advanced = show;
        self
    }

    pub fn with_global_edit_mode(mut self, mode: EditMode) -> Self {
        self.global_edit_mode = Some(mode);
        self
    }
}

/// Owns bound values by id and dispatches draw and bulk operations to them.
///
/// Insertion order is draw order. Re-adding an existing id replaces the
/// member in place, keeping its position.
pub struct ValueContainer {
    slots: SlotMap<SlotKey, Entry>,
    order: Vec<SlotKey>,
    index: HashMap<String, SlotKey>,
    config: ContainerConfig,
    value_changed: Signal<String>,
    applied: Signal<()>,
}

impl Default for ValueContainer {
    fn default() -> Self {
        Self::with_config(ContainerConfig::default())
    }
}

impl std::fmt::Debug for ValueContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueContainer")
            .field("config", &self.config)
            .field("ids", &self.ids())
            .finish()
    }
}

impl ValueContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            index: HashMap::new(),
            config,
            value_changed: Signal::new(),
            applied: Signal::new(),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ContainerConfig {
        &mut self.config
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.config.visible = visible;
    }

    pub fn set_show_advanced(&mut self, show: bool) {
        self.config.show_advanced = show;
    }

    pub fn set_immediate_apply(&mut self, immediate: bool) {
        self.config.immediate_apply = immediate;
    }

    /// Force `mode` onto every member from the next draw on.
    pub fn set_global_edit_mode(&mut self, mode: EditMode) {
        self.config.global_edit_mode = Some(mode);
    }

    /// Emitted with the member id for each member that changed during a draw.
    pub fn value_changed(&self) -> &Signal<String> {
        &self.value_changed
    }

    /// Emitted after every [`apply_all`](Self::apply_all).
    pub fn applied(&self) -> &Signal<()> {
        &self.applied
    }

    /// Connect a listener for changes of a single member.
    pub fn on_member_changed<F>(&self, id: impl Into<String>, listener: F) -> ConnectionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = id.into();
        self.value_changed.connect(move |changed: &String| {
            if *changed == id {
                listener();
            }
        })
    }

    /// Add `value` under `id`.
    ///
    /// A new id goes to the end of the draw order. An existing id keeps its
    /// position and the previous member is dropped.
    pub fn add<C: ValueControl>(
        &mut self,
        id: impl Into<String>,
        value: C,
    ) -> &mut (dyn ValueControl + 'static) {
        let id = id.into();
        let entry = Entry {
            id: id.clone(),
            control: Box::new(value),
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
        };

        let key = match self.index.get(&id) {
            Some(&key) => {
                tracing::debug!(
                    target: targets::CONTAINER,
                    %id,
                    type_name = entry.type_name,
                    "replaced value"
                );
                self.slots[key] = entry;
                key
            }
            None => {
                tracing::debug!(
                    target: targets::CONTAINER,
                    %id,
                    type_name = entry.type_name,
                    "added value"
                );
                let key = self.slots.insert(entry);
                self.order.push(key);
                self.index.insert(id, key);
                key
            }
        };
        &mut *self.slots[key].control
    }

    fn entry(&self, id: &str) -> Option<&Entry> {
        self.index.get(id).and_then(|key| self.slots.get(*key))
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.index.get(id).and_then(|key| self.slots.get_mut(*key))
    }

    /// The member under `id` if its concrete type is exactly `C`.
    pub fn get<C: ValueControl>(&self, id: &str) -> Option<&C> {
        self.entry(id)
            .filter(|entry| entry.type_id == TypeId::of::<C>())
            .and_then(|entry| entry.control.as_ref().downcast_ref::<C>())
    }

    pub fn get_mut<C: ValueControl>(&mut self, id: &str) -> Option<&mut C> {
        self.entry_mut(id)
            .filter(|entry| entry.type_id == TypeId::of::<C>())
            .and_then(|entry| entry.control.as_mut().downcast_mut::<C>())
    }

    /// Like [`get`](Self::get), telling a missing id apart from a type mismatch.
    pub fn try_get<C: ValueControl>(&self, id: &str) -> Result<&C> {
        let entry = self.entry(id).ok_or_else(|| BindError::not_found(id))?;
        entry
            .control
            .as_ref()
            .downcast_ref::<C>()
            .ok_or_else(|| BindError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<C>(),
                actual: entry.type_name,
            })
    }

    /// Type-erased access to a member.
    pub fn control(&self, id: &str) -> Option<&(dyn ValueControl + 'static)> {
        self.entry(id).map(|entry| &*entry.control)
    }

    pub fn control_mut(&mut self, id: &str) -> Option<&mut (dyn ValueControl + 'static)> {
        self.entry_mut(id).map(|entry| &mut *entry.control)
    }

    /// Capability `C` of the member under `id`.
    pub fn query<C: Capability + ?Sized>(&self, id: &str) -> Result<&C> {
        let control = self.control(id).ok_or_else(|| BindError::not_found(id))?;
        control
            .query_interface::<C>()
            .ok_or_else(|| BindError::CapabilityMissing {
                id: id.to_string(),
                capability: C::FLAG,
            })
    }

    pub fn query_mut<C: Capability + ?Sized>(&mut self, id: &str) -> Result<&mut C> {
        let control = self.control_mut(id).ok_or_else(|| BindError::not_found(id))?;
        control
            .query_interface_mut::<C>()
            .ok_or_else(|| BindError::CapabilityMissing {
                id: id.to_string(),
                capability: C::FLAG,
            })
    }

    /// Name of the concrete type stored under `id`.
    pub fn type_name_of(&self, id: &str) -> Option<&'static str> {
        self.entry(id).map(|entry| entry.type_name)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove and drop the member under `id`. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(key) = self.index.remove(id) else {
            return false;
        };
        self.slots.remove(key);
        self.order.retain(|k| *k != key);
        tracing::debug!(target: targets::CONTAINER, %id, "removed value");
        true
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
        self.index.clear();
    }

    /// Member ids in draw order.
    pub fn ids(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|key| self.slots.get(*key))
            .map(|entry| entry.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn members(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|key| self.slots.get(*key))
    }

    /// Draw every shown member in order and return the ids that changed.
    ///
    /// Invisible members are skipped, as are advanced members unless
    /// `show_advanced` is set. Each member's changed state is cleared right
    /// before it is drawn. `value_changed` fires after the whole pass for
    /// every changed member, or, in immediate mode, right after the member
    /// that reported the change, once its staged edit has been applied.
    pub fn draw_all(&mut self) -> Vec<String> {
        if !self.config.visible {
            return Vec::new();
        }
        let _span = PerfSpan::new(span_names::DRAW_ALL);

        let Self {
            slots,
            order,
            config,
            value_changed,
            ..
        } = self;

        let mut changed = Vec::new();
        for key in order.iter() {
            let Some(entry) = slots.get_mut(*key) else {
                continue;
            };
            let control = entry.control.as_mut();

            if let Some(visibility) = control.query_interface::<dyn VisibilityControl>()
                && (!visibility.is_visible() || (visibility.is_advanced() && !config.show_advanced))
            {
                continue;
            }
            if let Some(mode) = config.global_edit_mode {
                control.set_edit_mode(mode);
            }

            control.clear_changed();
            let name = control.name();
            let label = if name.is_empty() { entry.id.as_str() } else { name.as_str() };
            let reported = control.draw(label);

            if reported && config.immediate_apply {
                if let Some(deferred) = control.query_interface_mut::<dyn DeferredUpdate>() {
                    deferred.apply_changes();
                }
                value_changed.emit(entry.id.clone());
            }
            if control.is_changed() {
                changed.push(entry.id.clone());
            }
        }

        if !config.immediate_apply {
            for id in &changed {
                value_changed.emit(id.clone());
            }
        }
        if !changed.is_empty() {
            tracing::debug!(target: targets::CONTAINER, ?changed, "draw pass changed values");
        }
        changed
    }

    /// Whether any deferred member has a staged value differing from its committed one.
    pub fn has_pending_changes(&self) -> bool {
        self.members().any(|entry| {
            entry
                .control
                .query_interface::<dyn DeferredUpdate>()
                .is_some_and(|deferred| deferred.has_pending_changes())
        })
    }

    /// Commit every deferred member. Returns how many committed something.
    pub fn apply_all(&mut self) -> usize {
        let _span = PerfSpan::new(span_names::APPLY_ALL);
        let mut count = 0;
        for key in &self.order {
            if let Some(entry) = self.slots.get_mut(*key)
                && let Some(deferred) = entry.control.query_interface_mut::<dyn DeferredUpdate>()
                && deferred.apply_changes()
            {
                count += 1;
            }
        }
        tracing::debug!(target: targets::CONTAINER, count, "applied pending values");
        self.applied.emit(());
        count
    }

    /// Discard every staged value.
    pub fn revert_all(&mut self) {
        let _span = PerfSpan::new(span_names::REVERT_ALL);
        for key in &self.order {
            if let Some(entry) = self.slots.get_mut(*key)
                && let Some(deferred) = entry.control.query_interface_mut::<dyn DeferredUpdate>()
            {
                deferred.revert_changes();
            }
        }
        tracing::debug!(target: targets::CONTAINER, "reverted pending values");
    }

    /// Pull every externally synced member. Returns how many changed.
    pub fn sync_all_from_external(&mut self) -> usize {
        let _span = PerfSpan::new(span_names::SYNC_ALL);
        let mut count = 0;
        for key in &self.order {
            if let Some(entry) = self.slots.get_mut(*key)
                && let Some(sync) = entry.control.query_interface_mut::<dyn ExternalSync>()
                && sync.sync_from_external()
            {
                count += 1;
            }
        }
        count
    }

    /// Push every externally synced member. Returns how many had a setter.
    pub fn sync_all_to_external(&mut self) -> usize {
        let _span = PerfSpan::new(span_names::SYNC_ALL);
        let mut count = 0;
        for key in &self.order {
            if let Some(entry) = self.slots.get_mut(*key)
                && let Some(sync) = entry.control.query_interface_mut::<dyn ExternalSync>()
                && sync.sync_to_external()
            {
                count += 1;
            }
        }
        count
    }

    /// Whether any member is marked advanced.
    pub fn has_advanced_values(&self) -> bool {
        self.members().any(|entry| {
            entry
                .control
                .query_interface::<dyn VisibilityControl>()
                .is_some_and(|visibility| visibility.is_advanced())
        })
    }

    pub fn add_toggle(
        &mut self,
        id: impl Into<String>,
        initial: bool,
        label: &str,
        tooltip: &str,
    ) -> &mut (dyn ValueControl + 'static) {
        let mut toggle = SimpleValue::new(initial);
        *toggle.hints_mut() = WidgetHints::new(WidgetKind::Checkbox);
        let control = self.add(id, toggle);
        control.set_name(label);
        control.set_tooltip(tooltip);
        control
    }

    pub fn add_float(
        &mut self,
        id: impl Into<String>,
        initial: f32,
    ) -> &mut (dyn ValueControl + 'static) {
        self.add(id, SimpleValue::new(initial))
    }

    pub fn add_slider(
        &mut self,
        id: impl Into<String>,
        min: f32,
        max: f32,
        initial: f32,
    ) -> &mut (dyn ValueControl + 'static) {
        let mut slider = SimpleValue::new(initial);
        *slider.hints_mut() = WidgetHints::new(WidgetKind::Slider).with_range(min, max);
        self.add(id, slider)
    }

    pub fn add_combo<I, S>(
        &mut self,
        id: impl Into<String>,
        options: I,
        initial: i32,
    ) -> &mut (dyn ValueControl + 'static)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut combo = SimpleValue::new(initial);
        *combo.hints_mut() = WidgetHints::new(WidgetKind::Combo).with_options(options);
        self.add(id, combo)
    }
}

static_assertions::assert_impl_all!(ValueContainer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ConfigValue, MonitoredValue};
    use crate::widget::{widget_fn, DrawContext, Response};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn bumping_config(initial: i32) -> ConfigValue<i32> {
        let mut value = ConfigValue::new(initial);
        value.set_widget(widget_fn(|cx: DrawContext<'_, i32>| {
            *cx.value += 1;
            Response::changed()
        }));
        value
    }

    #[test]
    fn test_add_preserves_order_on_replace() {
        let mut container = ValueContainer::new();
        container.add("a", SimpleValue::new(1));
        container.add("b", SimpleValue::new(2));
        container.add("c", SimpleValue::new(3));

        container.add("b", ConfigValue::new(20));

        assert_eq!(container.ids(), vec!["a", "b", "c"]);
        assert_eq!(container.len(), 3);
        assert!(container.get::<SimpleValue<i32>>("b").is_none());
        assert_eq!(*container.get::<ConfigValue<i32>>("b").unwrap().value(), 20);
    }

    #[test]
    fn test_get_requires_exact_type() {
        let mut container = ValueContainer::new();
        container.add("x", SimpleValue::new(1i32));

        assert!(container.get::<SimpleValue<i64>>("x").is_none());
        assert!(container.get::<SimpleValue<i32>>("missing").is_none());
        assert!(matches!(
            container.try_get::<SimpleValue<i64>>("x"),
            Err(BindError::TypeMismatch { .. })
        ));
        assert_eq!(
            container.try_get::<SimpleValue<i32>>("missing").unwrap_err(),
            BindError::not_found("missing")
        );
        assert_eq!(container.type_name_of("x"), Some(type_name::<SimpleValue<i32>>()));
    }

    #[test]
    fn test_remove() {
        let mut container = ValueContainer::new();
        container.add("a", SimpleValue::new(1));
        container.add("b", SimpleValue::new(2));

        assert!(container.remove("a"));
        assert!(!container.remove("a"));
        assert_eq!(container.ids(), vec!["b"]);
        assert!(!container.contains("a"));

        container.clear();
        assert!(container.is_empty());
    }

    #[test]
    fn test_query_reports_missing_capability() {
        let mut container = ValueContainer::new();
        container.add("plain", SimpleValue::new(1));
        container.add("config", ConfigValue::new(1));

        assert!(container.query::<dyn DeferredUpdate>("config").is_ok());
        assert!(matches!(
            container.query::<dyn DeferredUpdate>("plain"),
            Err(BindError::CapabilityMissing { .. })
        ));
        assert!(matches!(
            container.query_mut::<dyn DeferredUpdate>("nope"),
            Err(BindError::NotFound { .. })
        ));
    }

    #[test]
    fn test_draw_all_deferred_notification() {
        let mut container = ValueContainer::new();
        container.add("a", SimpleValue::new(1));
        container.add("b", bumping_config(10));
        container.add("c", SimpleValue::new(3));

        let fired = Arc::new(Mutex::new(Vec::new()));
        let f = fired.clone();
        container
            .value_changed()
            .connect(move |id: &String| f.lock().push(id.clone()));

        let changed = container.draw_all();
        assert_eq!(changed, vec!["b".to_string()]);
        assert_eq!(*fired.lock(), vec!["b".to_string()]);
        assert!(container.has_pending_changes());

        assert_eq!(container.apply_all(), 1);
        assert!(!container.has_pending_changes());
        assert_eq!(*container.get::<ConfigValue<i32>>("b").unwrap().value(), 11);
    }

    #[test]
    fn test_draw_all_immediate_applies() {
        let mut container =
            ValueContainer::with_config(ContainerConfig::new().with_immediate_apply(true));
        container.add("b", bumping_config(10));

        let seen = Arc::new(Mutex::new(0));
        let s = seen.clone();
        container.on_member_changed("b", move || *s.lock() += 1);

        container.draw_all();
        assert_eq!(*seen.lock(), 1);
        assert!(!container.has_pending_changes());
        assert_eq!(*container.get::<ConfigValue<i32>>("b").unwrap().value(), 11);
    }

    #[test]
    fn test_draw_all_skips_hidden_and_advanced() {
        let mut container = ValueContainer::new();
        let hidden = container.add("hidden", bumping_config(0));
        hidden
            .query_interface_mut::<dyn VisibilityControl>()
            .unwrap()
            .set_visible(false);
        let advanced = container.add("advanced", bumping_config(0));
        advanced
            .query_interface_mut::<dyn VisibilityControl>()
            .unwrap()
            .set_advanced(true);

        assert!(container.has_advanced_values());
        assert!(container.draw_all().is_empty());

        container.set_show_advanced(true);
        assert_eq!(container.draw_all(), vec!["advanced".to_string()]);

        container.set_visible(false);
        assert!(container.draw_all().is_empty());
    }

    #[test]
    fn test_global_edit_mode_blocks_edits() {
        let mut container = ValueContainer::new();
        container.add("b", bumping_config(10));
        container.set_global_edit_mode(EditMode::ReadOnly);

        assert!(container.draw_all().is_empty());
        assert_eq!(container.control("b").unwrap().edit_mode(), EditMode::ReadOnly);
        assert!(!container.has_pending_changes());
    }

    #[test]
    fn test_revert_all_and_applied_signal() {
        let mut container = ValueContainer::new();
        container.add("b", bumping_config(10));
        container.draw_all();

        container.revert_all();
        assert!(!container.has_pending_changes());

        let applied = Arc::new(Mutex::new(0));
        let a = applied.clone();
        container.applied().connect(move |_| *a.lock() += 1);
        assert_eq!(container.apply_all(), 0);
        assert_eq!(*applied.lock(), 1);
    }

    #[test]
    fn test_bulk_external_sync() {
        let external = Arc::new(Mutex::new(5));
        let mut container = ValueContainer::new();
        let e = external.clone();
        let s = external.clone();
        container.add(
            "m",
            MonitoredValue::new_bound(move || *e.lock(), move |v: &i32| *s.lock() = *v, 0),
        );
        container.add("plain", SimpleValue::new(0));

        *external.lock() = 8;
        assert_eq!(container.sync_all_from_external(), 1);
        assert_eq!(container.get::<MonitoredValue<i32>>("m").unwrap().get(), 8);

        *external.lock() = 0;
        assert_eq!(container.sync_all_to_external(), 1);
        assert_eq!(*external.lock(), 8);
    }

    #[test]
    fn test_convenience_adders() {
        let mut container = ValueContainer::new();
        container.add_toggle("t", true, "Enabled", "Turns it on");
        container.add_float("f", 0.5);
        container.add_slider("s", 0.0, 1.0, 0.25);
        container.add_combo("c", ["Low", "High"], 1);

        let toggle = container.control("t").unwrap();
        assert_eq!(toggle.name(), "Enabled");
        assert_eq!(toggle.tooltip(), "Turns it on");
        assert_eq!(
            container.get::<SimpleValue<f32>>("s").unwrap().hints().range,
            Some((0.0, 1.0))
        );
        assert_eq!(container.get::<SimpleValue<i32>>("c").unwrap().hints().options.len(), 2);
        assert_eq!(container.ids(), vec!["t", "f", "s", "c"]);
    }
}
