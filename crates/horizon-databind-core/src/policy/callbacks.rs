//! User callbacks for hover and context-menu requests.

use std::fmt;
use std::sync::Arc;

/// Produces extra tooltip content while the control is hovered.
pub type TooltipCallback = Arc<dyn Fn() + Send + Sync>;

/// Populates a context menu for the control.
pub type ContextMenuCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct CallbacksPolicy {
    tooltip: Option<TooltipCallback>,
    context_menu: Option<ContextMenuCallback>,
}

impl fmt::Debug for CallbacksPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbacksPolicy")
            .field("tooltip", &self.tooltip.is_some())
            .field("context_menu", &self.context_menu.is_some())
            .finish()
    }
}

impl CallbacksPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tooltip_callback(&mut self, callback: TooltipCallback) {
        self.tooltip = Some(callback);
    }

    pub fn set_context_menu_callback(&mut self, callback: ContextMenuCallback) {
        self.context_menu = Some(callback);
    }

    pub fn has_tooltip_callback(&self) -> bool {
        self.tooltip.is_some()
    }

    pub fn has_context_menu_callback(&self) -> bool {
        self.context_menu.is_some()
    }

    /// Run the callbacks matching what the rendering collaborator reported.
    pub fn dispatch(&self, hovered: bool, context_menu_requested: bool) {
        if hovered && let Some(cb) = &self.tooltip {
            cb();
        }
        if context_menu_requested && let Some(cb) = &self.context_menu {
            cb();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispatch_matches_response() {
        let hovers = Arc::new(AtomicUsize::new(0));
        let menus = Arc::new(AtomicUsize::new(0));
        let mut policy = CallbacksPolicy::new();

        let h = hovers.clone();
        policy.set_tooltip_callback(Arc::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        let m = menus.clone();
        policy.set_context_menu_callback(Arc::new(move || {
            m.fetch_add(1, Ordering::SeqCst);
        }));

        policy.dispatch(true, false);
        policy.dispatch(false, false);
        policy.dispatch(true, true);

        assert_eq!(hovers.load(Ordering::SeqCst), 2);
        assert_eq!(menus.load(Ordering::SeqCst), 1);
    }
}
