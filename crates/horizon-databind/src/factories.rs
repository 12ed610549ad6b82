//! Ready-made composed values with presentation hints already set.
//!
//! Every factory returns an owned value, ready to be configured further or
//! handed to a [`ValueContainer`](crate::ValueContainer):
//!
//! ```
//! use horizon_databind::factories::{config_slider, monitored_toggle};
//! use horizon_databind::ValueContainer;
//!
//! let mut container = ValueContainer::new();
//! container.add("vsync", monitored_toggle(|| true, |_: &bool| {}, false));
//! container.add("volume", config_slider(0, 100, 50));
//!
//! assert_eq!(container.len(), 2);
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use horizon_databind_core::{
    BindValue, ConfigValue, FullValue, MonitoredValue, MonitoredValueWithText, SimpleValue,
    WidgetHints, WidgetKind,
};

/// A monitored value bound to `getter`/`setter`, pulled once on creation.
pub fn monitored<T, G, S>(getter: G, setter: S, default: T) -> MonitoredValue<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    MonitoredValue::new_bound(getter, setter, default)
}

fn monitored_as<T, G, S>(kind: WidgetKind, getter: G, setter: S, default: T) -> MonitoredValue<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    let mut value = monitored(getter, setter, default);
    value.hints_mut().kind = kind;
    value
}

pub fn monitored_toggle<G, S>(getter: G, setter: S, default: bool) -> MonitoredValue<bool>
where
    G: Fn() -> bool + Send + Sync + 'static,
    S: Fn(&bool) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Checkbox, getter, setter, default)
}

pub fn monitored_float<G, S>(getter: G, setter: S, default: f32) -> MonitoredValue<f32>
where
    G: Fn() -> f32 + Send + Sync + 'static,
    S: Fn(&f32) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Input, getter, setter, default)
}

pub fn monitored_double<G, S>(getter: G, setter: S, default: f64) -> MonitoredValue<f64>
where
    G: Fn() -> f64 + Send + Sync + 'static,
    S: Fn(&f64) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Input, getter, setter, default)
}

pub fn monitored_int32<G, S>(getter: G, setter: S, default: i32) -> MonitoredValue<i32>
where
    G: Fn() -> i32 + Send + Sync + 'static,
    S: Fn(&i32) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Input, getter, setter, default)
}

pub fn monitored_string<G, S>(getter: G, setter: S, default: &str) -> MonitoredValue<String>
where
    G: Fn() -> String + Send + Sync + 'static,
    S: Fn(&String) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Input, getter, setter, default.to_string())
}

pub fn monitored_multiline<G, S>(getter: G, setter: S, default: &str) -> MonitoredValue<String>
where
    G: Fn() -> String + Send + Sync + 'static,
    S: Fn(&String) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Multiline, getter, setter, default.to_string())
}

/// A monitored value that shows its formatted text next to the control.
pub fn monitored_with_text<T, G, S>(
    getter: G,
    setter: S,
    default: T,
) -> MonitoredValueWithText<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    MonitoredValueWithText::new_bound(getter, setter, default)
}

pub fn monitored_slider<T, G, S>(
    getter: G,
    setter: S,
    min: T,
    max: T,
    default: T,
) -> MonitoredValue<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    let mut value = monitored(getter, setter, default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Slider).with_range(min, max);
    value
}

pub fn monitored_slider_with_text<T, G, S>(
    getter: G,
    setter: S,
    min: T,
    max: T,
    default: T,
) -> MonitoredValueWithText<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    let mut value = monitored_with_text(getter, setter, default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Slider).with_range(min, max);
    value
}

/// A drag control. An empty range (`min == max`) means unbounded.
pub fn monitored_drag<T, G, S>(
    getter: G,
    setter: S,
    default: T,
    speed: f32,
    min: T,
    max: T,
) -> MonitoredValue<T>
where
    T: BindValue,
    G: Fn() -> T + Send + Sync + 'static,
    S: Fn(&T) + Send + Sync + 'static,
{
    let range = (min != max).then_some((min, max));
    let mut value = monitored(getter, setter, default);
    let hints = value.hints_mut();
    *hints = WidgetHints::new(WidgetKind::Drag).with_speed(speed);
    hints.range = range;
    value
}

pub fn monitored_combo<G, S, I, O>(
    getter: G,
    setter: S,
    options: I,
    default: i32,
) -> MonitoredValue<i32>
where
    G: Fn() -> i32 + Send + Sync + 'static,
    S: Fn(&i32) + Send + Sync + 'static,
    I: IntoIterator<Item = O>,
    O: Into<String>,
{
    let mut value = monitored(getter, setter, default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Combo).with_options(options);
    value
}

pub fn monitored_radio<G, S, I, O>(
    getter: G,
    setter: S,
    options: I,
    default: i32,
) -> MonitoredValue<i32>
where
    G: Fn() -> i32 + Send + Sync + 'static,
    S: Fn(&i32) + Send + Sync + 'static,
    I: IntoIterator<Item = O>,
    O: Into<String>,
{
    let mut value = monitored(getter, setter, default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Radio).with_options(options);
    value
}

/// An RGB or RGBA color with components in `0.0..=1.0`.
pub fn monitored_color<const N: usize, G, S>(
    getter: G,
    setter: S,
    default: [f32; N],
) -> MonitoredValue<[f32; N]>
where
    G: Fn() -> [f32; N] + Send + Sync + 'static,
    S: Fn(&[f32; N]) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Color, getter, setter, default)
}

pub fn monitored_vector<const N: usize, G, S>(
    getter: G,
    setter: S,
    default: [f32; N],
) -> MonitoredValue<[f32; N]>
where
    G: Fn() -> [f32; N] + Send + Sync + 'static,
    S: Fn(&[f32; N]) + Send + Sync + 'static,
{
    monitored_as(WidgetKind::Vector, getter, setter, default)
}

/// A monitored value bound to one field of a shared object.
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::RwLock;
/// use horizon_databind::factories::monitored_field;
///
/// struct Settings { volume: i32 }
///
/// let settings = Arc::new(RwLock::new(Settings { volume: 7 }));
/// let volume = monitored_field(&settings, |s| s.volume, |s, v| s.volume = v, 0);
/// assert_eq!(volume.get(), 7);
///
/// volume.set(3);
/// assert_eq!(settings.read().volume, 3);
/// ```
pub fn monitored_field<O, T>(
    object: &Arc<RwLock<O>>,
    read: fn(&O) -> T,
    write: fn(&mut O, T),
    default: T,
) -> MonitoredValue<T>
where
    O: Send + Sync + 'static,
    T: BindValue,
{
    let source = object.clone();
    let sink = object.clone();
    monitored(
        move || read(&source.read()),
        move |value: &T| write(&mut sink.write(), value.clone()),
        default,
    )
}

/// A deferred, validated value.
pub fn config<T: BindValue>(default: T) -> ConfigValue<T> {
    ConfigValue::new(default)
}

fn config_as<T: BindValue>(kind: WidgetKind, default: T) -> ConfigValue<T> {
    let mut value = config(default);
    value.hints_mut().kind = kind;
    value
}

pub fn config_toggle(default: bool) -> ConfigValue<bool> {
    config_as(WidgetKind::Checkbox, default)
}

pub fn config_float(default: f32) -> ConfigValue<f32> {
    config_as(WidgetKind::Input, default)
}

pub fn config_int32(default: i32) -> ConfigValue<i32> {
    config_as(WidgetKind::Input, default)
}

pub fn config_string(default: &str) -> ConfigValue<String> {
    config_as(WidgetKind::Input, default.to_string())
}

pub fn config_slider<T: BindValue>(min: T, max: T, default: T) -> ConfigValue<T> {
    let mut value = config(default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Slider).with_range(min, max);
    value
}

pub fn config_combo<I, O>(options: I, default: i32) -> ConfigValue<i32>
where
    I: IntoIterator<Item = O>,
    O: Into<String>,
{
    let mut value = config(default);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Combo).with_options(options);
    value
}

/// A value without optional behaviors.
pub fn simple<T: BindValue>(initial: T) -> SimpleValue<T> {
    SimpleValue::new(initial)
}

pub fn simple_toggle(initial: bool) -> SimpleValue<bool> {
    let mut value = simple(initial);
    value.hints_mut().kind = WidgetKind::Checkbox;
    value
}

pub fn simple_float(initial: f32) -> SimpleValue<f32> {
    simple(initial)
}

pub fn simple_string(initial: &str) -> SimpleValue<String> {
    simple(initial.to_string())
}

pub fn simple_slider<T: BindValue>(min: T, max: T, initial: T) -> SimpleValue<T> {
    let mut value = simple(initial);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Slider).with_range(min, max);
    value
}

pub fn simple_combo<I, O>(options: I, initial: i32) -> SimpleValue<i32>
where
    I: IntoIterator<Item = O>,
    O: Into<String>,
{
    let mut value = simple(initial);
    *value.hints_mut() = WidgetHints::new(WidgetKind::Combo).with_options(options);
    value
}

/// A value with every capability.
pub fn full<T: BindValue>(default: T) -> FullValue<T> {
    FullValue::new(default)
}
