//! Independent capability policies.
//!
//! Each policy holds only its own state and talks to the value it is
//! attached to through [`ValueHost`](crate::cell::ValueHost). A composed
//! value type in [`crate::compose`] is a cell plus a visible list of these.
//!
//! | Policy | State |
//! |--------|-------|
//! | [`DeferredUpdatePolicy`] | staged value, dirty flag |
//! | [`ExternalSyncPolicy`] | getter and setter closures |
//! | [`ValidationPolicy`] | validator, last error |
//! | [`HistoryPolicy`] | bounded undo/redo sequence |
//! | [`ThreadSafetyPolicy`] | per-instance reader/writer lock |
//! | [`SourceTrackingPolicy`] | last-write source tag |
//! | [`ChangeNotificationPolicy`] | `(old, new)` and `()` listeners |
//! | [`DefaultValuePolicy`] | default value |
//! | [`VisibilityPolicy`] | visible, advanced, group |
//! | [`TextRepresentationPolicy`] | show flag, format string |
//! | [`CallbacksPolicy`] | tooltip and context-menu callbacks |

mod callbacks;
mod default_value;
mod deferred;
mod external;
mod history;
mod notify;
mod source;
mod text_repr;
mod thread_safety;
mod validation;
mod visibility;

pub use callbacks::{CallbacksPolicy, ContextMenuCallback, TooltipCallback};
pub use default_value::DefaultValuePolicy;
pub use deferred::DeferredUpdatePolicy;
pub use external::{ExternalSyncPolicy, Getter, Setter};
pub use history::{DEFAULT_MAX_HISTORY_SIZE, HistoryPolicy};
pub use notify::ChangeNotificationPolicy;
pub use source::{SourceTrackingPolicy, ValueSource};
pub use text_repr::TextRepresentationPolicy;
pub use thread_safety::ThreadSafetyPolicy;
pub use validation::{ValidationPolicy, Validator};
pub use visibility::VisibilityPolicy;
