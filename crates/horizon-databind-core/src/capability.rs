//! Capability descriptors and runtime capability queries.
//!
//! Every composed value type implements [`ValueControl`], the type-erased
//! handle the container works with, plus one trait per optional behavior it
//! supports. Which behaviors are present is described by a [`Capabilities`]
//! bit set that each composed type fixes as an associated constant.
//!
//! A caller holding only `&dyn ValueControl` discovers a behavior with
//! [`query_interface`](trait.ValueControl.html#method.query_interface):
//!
//! ```
//! use horizon_databind_core::{ConfigValue, DeferredUpdate, Historical, ValueControl};
//!
//! let mut value = ConfigValue::new(10);
//! value.try_set(20).unwrap();
//!
//! let control: &mut dyn ValueControl = &mut value;
//! assert!(control.query_interface::<dyn Historical>().is_none());
//!
//! let deferred = control.query_interface_mut::<dyn DeferredUpdate>().unwrap();
//! assert!(deferred.apply_changes());
//! ```
//!
//! The query checks the descriptor bit first and then asks the value for the
//! matching [`CapabilityRef`] variant. It yields a reference only when both
//! agree, so a value can never hand out a capability it does not declare.

use std::any::Any;

use crate::cell::EditMode;
use crate::policy::{ContextMenuCallback, TooltipCallback};

bitflags::bitflags! {
    /// The set of optional behaviors a composed value type provides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        const DEFERRED_UPDATE     = 1 << 0;
        const EXTERNAL_SYNC       = 1 << 1;
        const VALIDATION          = 1 << 2;
        const HISTORY             = 1 << 3;
        const VISIBILITY          = 1 << 4;
        const STRING_CONVERSION   = 1 << 5;
        const TEXT_REPRESENTATION = 1 << 6;
        const CUSTOM_CALLBACKS    = 1 << 7;
        const IMMEDIATE_APPLY     = 1 << 8;
    }
}

/// Staged edits committed on request.
pub trait DeferredUpdate {
    /// Commit the staged value. Returns whether anything was committed.
    fn apply_changes(&mut self) -> bool;
    /// Discard the staged value.
    fn revert_changes(&mut self);
    /// True when a staged value differs from the committed value.
    fn has_pending_changes(&self) -> bool;
    fn is_dirty(&self) -> bool;
}

/// Synchronization with a value owned elsewhere.
pub trait ExternalSync {
    /// Pull from the external getter. Returns whether the committed value changed.
    fn sync_from_external(&mut self) -> bool;
    /// Push the committed value through the external setter.
    fn sync_to_external(&mut self) -> bool;
    fn is_externally_synced(&self) -> bool;
}

/// Validation of the committed value.
pub trait Validatable {
    /// Validate the committed value and record the outcome.
    fn validate(&mut self) -> bool;
    fn is_valid(&self) -> bool;
    /// Message of the last failure, empty if none.
    fn validation_error(&self) -> String;
}

/// Undo/redo over committed values.
pub trait Historical {
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    fn undo(&mut self) -> bool;
    fn redo(&mut self) -> bool;
    fn clear_history(&mut self);
    fn history_size(&self) -> usize;
}

/// Visibility and grouping used by the container when drawing.
pub trait VisibilityControl {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn is_advanced(&self) -> bool;
    fn set_advanced(&mut self, advanced: bool);
    fn group(&self) -> String;
    fn set_group(&mut self, group: &str);
}

/// Conversion of the committed value to and from text.
pub trait StringConvertible {
    fn as_string(&self) -> String;
    /// Parse, validate and commit. Returns `false` and leaves the value
    /// untouched when the text is rejected.
    fn set_from_string(&mut self, text: &str) -> bool;
}

/// Formatted text shown next to a control.
pub trait TextRepresentation {
    fn show_text(&self) -> bool;
    fn set_show_text(&mut self, show: bool);
    fn text_format(&self) -> Option<String>;
    fn set_text_format(&mut self, format: &str);
    fn text_representation(&self) -> String;
}

/// Tooltip and context-menu hooks.
pub trait CustomCallbacks {
    fn set_tooltip_callback(&mut self, callback: TooltipCallback);
    fn set_context_menu_callback(&mut self, callback: ContextMenuCallback);
    fn has_tooltip_callback(&self) -> bool;
    fn has_context_menu_callback(&self) -> bool;
}

/// Commit every accepted edit as soon as it is drawn.
pub trait ImmediateApply {
    fn is_immediate_apply(&self) -> bool;
    fn set_immediate_apply(&mut self, immediate: bool);
}

/// Shared reference to one capability of a value.
pub enum CapabilityRef<'a> {
    DeferredUpdate(&'a (dyn DeferredUpdate + 'static)),
    ExternalSync(&'a (dyn ExternalSync + 'static)),
    Validation(&'a (dyn Validatable + 'static)),
    History(&'a (dyn Historical + 'static)),
    Visibility(&'a (dyn VisibilityControl + 'static)),
    StringConversion(&'a (dyn StringConvertible + 'static)),
    TextRepresentation(&'a (dyn TextRepresentation + 'static)),
    CustomCallbacks(&'a (dyn CustomCallbacks + 'static)),
    ImmediateApply(&'a (dyn ImmediateApply + 'static)),
}

/// Exclusive reference to one capability of a value.
pub enum CapabilityMut<'a> {
    DeferredUpdate(&'a mut (dyn DeferredUpdate + 'static)),
    ExternalSync(&'a mut (dyn ExternalSync + 'static)),
    Validation(&'a mut (dyn Validatable + 'static)),
    History(&'a mut (dyn Historical + 'static)),
    Visibility(&'a mut (dyn VisibilityControl + 'static)),
    StringConversion(&'a mut (dyn StringConvertible + 'static)),
    TextRepresentation(&'a mut (dyn TextRepresentation + 'static)),
    CustomCallbacks(&'a mut (dyn CustomCallbacks + 'static)),
    ImmediateApply(&'a mut (dyn ImmediateApply + 'static)),
}

/// The type-erased surface of a bound value.
///
/// This is what a [`ValueContainer`](crate::ValueContainer) stores and what
/// the rendering loop drives. Optional behaviors are reached through
/// [`capability`](Self::capability) or the typed `query_interface` on
/// `dyn ValueControl`.
pub trait ValueControl: Any + Send + Sync {
    fn name(&self) -> String;
    fn set_name(&mut self, name: &str);
    fn tooltip(&self) -> String;
    fn set_tooltip(&mut self, tooltip: &str);
    fn edit_mode(&self) -> EditMode;
    fn set_edit_mode(&mut self, mode: EditMode);

    /// Draw the control through its bound widget.
    ///
    /// Returns whether the user changed the value during this call.
    fn draw(&mut self, label: &str) -> bool;

    /// Whether the value changed since the last [`clear_changed`](Self::clear_changed).
    fn is_changed(&self) -> bool;
    fn clear_changed(&mut self);

    /// The fixed capability descriptor of the concrete type.
    fn capabilities(&self) -> Capabilities;

    /// Name of the bound value type.
    fn type_name(&self) -> &'static str;

    /// The capability matching a single `flag`, if provided.
    fn capability(&self, flag: Capabilities) -> Option<CapabilityRef<'_>> {
        let _ = flag;
        None
    }

    /// Exclusive form of [`capability`](Self::capability).
    fn capability_mut(&mut self, flag: Capabilities) -> Option<CapabilityMut<'_>> {
        let _ = flag;
        None
    }
}

/// A capability interface that can be queried on `dyn ValueControl`.
///
/// Implemented for each `dyn` capability trait in this module.
pub trait Capability: 'static {
    const FLAG: Capabilities;

    fn from_ref(cap: CapabilityRef<'_>) -> Option<&Self>;
    fn from_mut(cap: CapabilityMut<'_>) -> Option<&mut Self>;
}

macro_rules! impl_capability {
    ($($trait:ident => $variant:ident, $flag:ident;)*) => {
        $(
            impl Capability for dyn $trait {
                const FLAG: Capabilities = Capabilities::$flag;

                fn from_ref(cap: CapabilityRef<'_>) -> Option<&Self> {
                    match cap {
                        CapabilityRef::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn from_mut(cap: CapabilityMut<'_>) -> Option<&mut Self> {
                    match cap {
                        CapabilityMut::$variant(c) => Some(c),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_capability! {
    DeferredUpdate => DeferredUpdate, DEFERRED_UPDATE;
    ExternalSync => ExternalSync, EXTERNAL_SYNC;
    Validatable => Validation, VALIDATION;
    Historical => History, HISTORY;
    VisibilityControl => Visibility, VISIBILITY;
    StringConvertible => StringConversion, STRING_CONVERSION;
    TextRepresentation => TextRepresentation, TEXT_REPRESENTATION;
    CustomCallbacks => CustomCallbacks, CUSTOM_CALLBACKS;
    ImmediateApply => ImmediateApply, IMMEDIATE_APPLY;
}

impl dyn ValueControl {
    /// Get capability `C` if the descriptor declares it, else `None`.
    pub fn query_interface<C: Capability + ?Sized>(&self) -> Option<&C> {
        if !self.capabilities().contains(C::FLAG) {
            return None;
        }
        self.capability(C::FLAG).and_then(C::from_ref)
    }

    /// Exclusive form of [`query_interface`](Self::query_interface).
    pub fn query_interface_mut<C: Capability + ?Sized>(&mut self) -> Option<&mut C> {
        if !self.capabilities().contains(C::FLAG) {
            return None;
        }
        self.capability_mut(C::FLAG).and_then(C::from_mut)
    }

    /// Whether every flag in `flags` is declared.
    pub fn has_capability(&self, flags: Capabilities) -> bool {
        self.capabilities().contains(flags)
    }

    /// Downcast to the concrete composed type.
    pub fn downcast_ref<C: ValueControl>(&self) -> Option<&C> {
        (self as &dyn Any).downcast_ref::<C>()
    }

    /// Downcast to the concrete composed type.
    pub fn downcast_mut<C: ValueControl>(&mut self) -> Option<&mut C> {
        (self as &mut dyn Any).downcast_mut::<C>()
    }

    pub fn is<C: ValueControl>(&self) -> bool {
        (self as &dyn Any).is::<C>()
    }
}
