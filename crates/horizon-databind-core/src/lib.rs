//! Core systems for Horizon Databind.
//!
//! This crate binds typed values to optional, independently composable
//! behaviors and lets type-erased callers discover which ones a value has:
//!
//! - **Value cell**: committed value, changed flag, display metadata, edit mode
//! - **Policies**: deferred update, external sync, validation, history,
//!   thread safety, source tracking, change notification and more
//! - **Capability query**: ask a `dyn ValueControl` for a behavior and get it
//!   only if the concrete type declares it
//! - **Composed values**: simple, monitored, config and full compositions
//! - **Container**: ordered, id-keyed registry with bulk draw/apply/revert
//! - **Builder**: one fluent setup chain for every composed type
//! - **Signal/Slot System**: thread-safe notification used by all of the above
//!
//! # Deferred Edit Example
//!
//! ```
//! use horizon_databind_core::{ConfigValue, DeferredUpdate};
//!
//! let mut threshold = ConfigValue::new(10);
//! threshold.set_validator(|v: &i32| if *v > 0 { Ok(*v) } else { Err("must be positive".into()) });
//!
//! threshold.try_set(20).unwrap();
//! assert!(threshold.try_set(-5).is_err());
//! assert!(threshold.has_pending_changes());
//!
//! threshold.apply_changes();
//! assert_eq!(*threshold.value(), 20);
//! ```
//!
//! # Monitored Value Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use horizon_databind_core::{MonitoredValue, ValueSource};
//!
//! let flag = Arc::new(AtomicBool::new(true));
//! let (get, set) = (flag.clone(), flag.clone());
//! let value = MonitoredValue::new_bound(
//!     move || get.load(Ordering::SeqCst),
//!     move |v: &bool| set.store(*v, Ordering::SeqCst),
//!     false,
//! );
//! assert!(value.get());
//!
//! value.set(false);
//! assert!(!flag.load(Ordering::SeqCst));
//! assert_eq!(value.last_source(), ValueSource::User);
//! ```

pub mod builder;
pub mod capability;
mod cell;
mod compose;
pub mod container;
mod error;
pub mod logging;
pub mod policy;
pub mod signal;
pub mod text;
pub mod widget;

pub use builder::{make_builder, Configure, ValueBuilder};
pub use capability::{
    Capabilities, Capability, CapabilityMut, CapabilityRef, CustomCallbacks, DeferredUpdate,
    ExternalSync, Historical, ImmediateApply, StringConvertible, TextRepresentation, Validatable,
    ValueControl, VisibilityControl,
};
pub use cell::{BindValue, EditMode, ValueCell, ValueHost};
pub use compose::{
    ConfigValue, FullValue, MonitoredValue, MonitoredValueWithText, SharedValue, SimpleValue,
    ValueHandle,
};
pub use container::{ContainerConfig, ValueContainer};
pub use error::{BindError, Result, ValidationResult};
pub use logging::{ContainerDebug, DebugFormatOptions, DebugStyle, PerfSpan};
pub use policy::ValueSource;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use text::TextValue;
pub use widget::{DrawContext, Response, Widget, WidgetHints, WidgetKind};
