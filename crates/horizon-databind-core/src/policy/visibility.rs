//! Display grouping and visibility.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityPolicy {
    visible: bool,
    advanced: bool,
    group: String,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            visible: true,
            advanced: false,
            group: String::new(),
        }
    }
}

impl VisibilityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Advanced values are drawn only when the container shows them.
    pub fn is_advanced(&self) -> bool {
        self.advanced
    }

    pub fn set_advanced(&mut self, advanced: bool) {
        self.advanced = advanced;
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }
}
