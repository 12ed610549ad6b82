//! Optional text shown alongside a value.

use crate::cell::BindValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRepresentationPolicy {
    show_text: bool,
    format: Option<String>,
}

impl TextRepresentationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_text(&self) -> bool {
        self.show_text
    }

    pub fn set_show_text(&mut self, show: bool) {
        self.show_text = show;
    }

    /// The printf-style format, if one is set.
    pub fn text_format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Set the format; an empty string restores the type's default rendering.
    pub fn set_text_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        self.format = (!format.is_empty()).then_some(format);
    }

    /// Render `value` with the configured format.
    pub fn render<T: BindValue>(&self, value: &T) -> String {
        value.to_text(self.text_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_and_without_format() {
        let mut policy = TextRepresentationPolicy::new();
        assert_eq!(policy.render(&0.5f32), "0.500");

        policy.set_text_format("%.1f%%");
        assert_eq!(policy.render(&0.5f32), "0.5%");

        policy.set_text_format("");
        assert_eq!(policy.text_format(), None);
    }
}
