//! Concrete bound-value types assembled from a cell and a list of policies.
//!
//! | Type | Policies | Capabilities |
//! |------|----------|--------------|
//! | [`SimpleValue`] | none | none |
//! | [`MonitoredValue`] | external sync, thread safety, source, notification | `EXTERNAL_SYNC` |
//! | [`MonitoredValueWithText`] | the above + text representation | `EXTERNAL_SYNC`, `TEXT_REPRESENTATION` |
//! | [`ConfigValue`] | deferred, default, validation, source, visibility | `DEFERRED_UPDATE`, `VALIDATION`, `VISIBILITY`, `STRING_CONVERSION`, `IMMEDIATE_APPLY` |
//! | [`FullValue`] | all of them | all |

mod config;
mod full;
mod handle;
mod monitored;
mod simple;

pub use config::ConfigValue;
pub use full::FullValue;
pub use handle::{SharedValue, ValueHandle};
pub use monitored::{MonitoredValue, MonitoredValueWithText};
pub use simple::SimpleValue;

use crate::cell::{BindValue, ValueCell, ValueHost};
use crate::policy::{SourceTrackingPolicy, ValueSource};

/// Presents a cell and its source tag to a policy.
pub(crate) struct TrackedHost<'a, T> {
    cell: &'a mut ValueCell<T>,
    source: &'a mut SourceTrackingPolicy,
}

impl<'a, T> TrackedHost<'a, T> {
    pub fn new(cell: &'a mut ValueCell<T>, source: &'a mut SourceTrackingPolicy) -> Self {
        Self { cell, source }
    }
}

impl<T: BindValue> ValueHost<T> for TrackedHost<'_, T> {
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
