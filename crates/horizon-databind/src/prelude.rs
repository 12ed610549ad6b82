//! Prelude module for Horizon Databind.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_databind::prelude::*;
//! ```
//!
//! This provides access to:
//! - Composed values (`SimpleValue`, `MonitoredValue`, `ConfigValue`, `FullValue`)
//! - Capability traits and the type-erased `ValueControl`
//! - The `ValueContainer` registry and the fluent builder
//! - Widget hints and the drawing seam (`Widget`, `DrawContext`)

// ============================================================================
// Composed Values
// ============================================================================

pub use crate::{
    ConfigValue, FullValue, MonitoredValue, MonitoredValueWithText, SimpleValue, ValueHandle,
};

// ============================================================================
// Capabilities
// ============================================================================

pub use crate::{
    Capabilities, CustomCallbacks, DeferredUpdate, ExternalSync, Historical, ImmediateApply,
    StringConvertible, TextRepresentation, Validatable, ValueControl, VisibilityControl,
};

// ============================================================================
// Value Cell
// ============================================================================

pub use crate::{BindValue, EditMode, ValueSource};

// ============================================================================
// Container and Builder
// ============================================================================

pub use crate::{make_builder, ContainerConfig, ValueBuilder, ValueContainer};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::{DrawContext, Response, Widget, WidgetHints, WidgetKind};

// ============================================================================
// Signals and Errors
// ============================================================================

pub use crate::{BindError, ConnectionId, Result, Signal};

// ============================================================================
// Factories
// ============================================================================

pub use crate::factories;
