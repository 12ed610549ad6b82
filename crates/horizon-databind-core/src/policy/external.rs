//! Bridging a committed value to a value owned elsewhere.

use std::fmt;
use std::sync::Arc;

use super::ValueSource;
use crate::cell::{BindValue, ValueHost};
use crate::logging::targets;

/// Reads the external value.
pub type Getter<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Writes a value to the external side.
pub type Setter<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Optional getter/setter pair connecting a value to an external owner.
///
/// Cloning is cheap; thread-safe compositions clone the policy under a lock
/// and call the closures after releasing it.
pub struct ExternalSyncPolicy<T> {
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T> Default for ExternalSyncPolicy<T> {
    fn default() -> Self {
        Self {
            getter: None,
            setter: None,
        }
    }
}

impl<T> Clone for ExternalSyncPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for ExternalSyncPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalSyncPolicy")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

impl<T: BindValue> ExternalSyncPolicy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy bound to both directions.
    pub fn bound<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            getter: Some(Arc::new(getter)),
            setter: Some(Arc::new(setter)),
        }
    }

    pub fn set_getter<G>(&mut self, getter: G)
    where
        G: Fn() -> T + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
    }

    pub fn set_setter<S>(&mut self, setter: S)
    where
        S: Fn(&T) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
    }

    /// True when a getter or a setter is registered.
    pub fn is_externally_synced(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    /// Read the external value without touching any host.
    pub fn pull(&self) -> Option<T> {
        self.getter.as_ref().map(|getter| getter())
    }

    /// Write `value` to the external side. Returns whether a setter ran.
    pub fn push(&self, value: &T) -> bool {
        match &self.setter {
            Some(setter) => {
                tracing::trace!(target: targets::SYNC, ?value, "pushed value to external");
                setter(value);
                true
            }
            None => false,
        }
    }

    /// Commit a value previously obtained from [`pull`](Self::pull), tagging
    /// it as external. Returns the replaced value when it differed.
    pub fn apply_pulled<H: ValueHost<T> + ?Sized>(host: &mut H, value: T) -> Option<T> {
        if *host.current() == value {
            return None;
        }
        tracing::trace!(target: targets::SYNC, ?value, "pulled value from external");
        let old = host.current().clone();
        host.commit(value);
        host.record_source(ValueSource::External);
        Some(old)
    }

    /// Whether a value pulled now would be committed to `host`.
    ///
    /// Pending user edits win: the pull is skipped, not merged, and the
    /// getter is not called at all.
    pub fn accepts_pull<H: ValueHost<T> + ?Sized>(&self, host: &H) -> bool {
        if self.getter.is_none() {
            return false;
        }
        if host.has_unapplied_edits() {
            tracing::trace!(target: targets::SYNC, "skipped external pull over pending edits");
            return false;
        }
        true
    }

    /// Commit a pulled value unless `host` gained unapplied edits since the
    /// getter ran. Returns the replaced value when it differed.
    pub fn commit_pulled<H: ValueHost<T> + ?Sized>(host: &mut H, value: T) -> Option<T> {
        if host.has_unapplied_edits() {
            tracing::trace!(target: targets::SYNC, "dropped external pull over pending edits");
            return None;
        }
        Self::apply_pulled(host, value)
    }

    /// Pull from the getter and commit unless the host has unapplied edits.
    ///
    /// Returns the replaced value when the committed value changed.
    pub fn sync_from_external<H: ValueHost<T> + ?Sized>(&self, host: &mut H) -> Option<T> {
        if !self.accepts_pull(&*host) {
            return None;
        }
        let value = self.pull()?;
        Self::commit_pulled(host, value)
    }

    /// Push the committed value of `host` through the setter.
    pub fn sync_to_external<H: ValueHost<T> + ?Sized>(&self, host: &H) -> bool {
        self.push(host.current())
    }
}
