//! Logging and debugging facilities for Horizon Databind.
//!
//! This module provides:
//! - Stable `tracing` targets and span names for every subsystem
//! - A debug dump of container contents
//! - Performance spans for bulk container operations
//!
//! # Tracing Integration
//!
//! The library never installs a subscriber. To see logs, install one in your
//! application and filter on the targets in [`targets`]:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_max_level(tracing::Level::DEBUG)
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`ContainerDebug`] to list a container's members in draw order:
//!
//! ```
//! use horizon_databind_core::logging::ContainerDebug;
//! use horizon_databind_core::{ConfigValue, ValueContainer};
//!
//! let mut container = ValueContainer::new();
//! container.add("volume", ConfigValue::new(5));
//!
//! let dump = ContainerDebug::new().format(&container);
//! assert!(dump.contains("volume"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::capability::{Capabilities, DeferredUpdate};
use crate::container::ValueContainer;

/// Span names used throughout Horizon Databind for tracing.
pub mod span_names {
    /// Container draw pass span.
    pub const DRAW_ALL: &str = "horizon_databind::draw_all";
    /// Container bulk apply span.
    pub const APPLY_ALL: &str = "horizon_databind::apply_all";
    /// Container bulk revert span.
    pub const REVERT_ALL: &str = "horizon_databind::revert_all";
    /// Container bulk external sync span.
    pub const SYNC_ALL: &str = "horizon_databind::sync_all";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Crate root target; a directive on it covers every subsystem.
    pub const CORE: &str = "horizon_databind_core";
    /// Signal/slot target.
    pub const SIGNAL: &str = "horizon_databind_core::signal";
    /// Policy target (staging, history, validation).
    pub const POLICY: &str = "horizon_databind_core::policy";
    /// External synchronization target.
    pub const SYNC: &str = "horizon_databind_core::sync";
    /// Composed value target.
    pub const COMPOSE: &str = "horizon_databind_core::compose";
    /// Container target.
    pub const CONTAINER: &str = "horizon_databind_core::container";
    /// Builder target.
    pub const BUILDER: &str = "horizon_databind_core::builder";
}

/// Style options for container dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugStyle {
    /// ASCII characters for list branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for container debug output.
#[derive(Debug, Clone)]
pub struct DebugFormatOptions {
    pub style: DebugStyle,
    /// Whether to show the value's type name.
    pub show_types: bool,
    /// Whether to list the capability flags.
    pub show_capabilities: bool,
    /// Whether to mark members with staged edits.
    pub show_pending: bool,
}

impl Default for DebugFormatOptions {
    fn default() -> Self {
        Self {
            style: DebugStyle::default(),
            show_types: true,
            show_capabilities: false,
            show_pending: true,
        }
    }
}

impl DebugFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_capabilities: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_types: false,
            show_capabilities: false,
            show_pending: false,
            ..Default::default()
        }
    }
}

/// Debug utility for dumping a container's members in draw order.
#[derive(Debug, Clone, Default)]
pub struct ContainerDebug {
    options: DebugFormatOptions,
}

impl ContainerDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DebugFormatOptions) -> Self {
        Self { options }
    }

    /// Format every member of `container`.
    pub fn format(&self, container: &ValueContainer) -> String {
        let mut output = String::new();
        let title = if container.config().name.is_empty() {
            "(unnamed)"
        } else {
            container.config().name.as_str()
        };
        let _ = writeln!(output, "Container {title} ({} values):", container.len());

        let ids = container.ids();
        if ids.is_empty() {
            let _ = writeln!(output, "  (empty)");
            return output;
        }

        let count = ids.len();
        for (i, id) in ids.iter().enumerate() {
            let Some(control) = container.control(id) else {
                continue;
            };
            output.push_str(self.prefix(i + 1 == count));
            output.push_str(id);

            let name = control.name();
            if !name.is_empty() && name != *id {
                let _ = write!(output, " \"{name}\"");
            }

            if self.options.show_types {
                let full = control.type_name();
                let short = full.rsplit("::").next().unwrap_or(full);
                let _ = write!(output, " ({short})");
            }

            if self.options.show_capabilities {
                let names = capability_names(control.capabilities());
                let _ = write!(output, " [{}]", names.join(", "));
            }

            if self.options.show_pending
                && control
                    .query_interface::<dyn DeferredUpdate>()
                    .is_some_and(|deferred| deferred.has_pending_changes())
            {
                output.push_str(" *pending*");
            }

            output.push('\n');
        }
        output
    }

    fn prefix(&self, is_last: bool) -> &'static str {
        match (self.options.style, is_last) {
            (DebugStyle::Ascii, false) => "+-- ",
            (DebugStyle::Ascii, true) => "`-- ",
            (DebugStyle::Unicode, false) => "\u{251c}\u{2500}\u{2500} ",
            (DebugStyle::Unicode, true) => "\u{2514}\u{2500}\u{2500} ",
            (DebugStyle::Compact, _) => "- ",
        }
    }
}

/// The capability flags a dump would show for `caps`, by name.
pub fn capability_names(caps: Capabilities) -> Vec<&'static str> {
    caps.iter_names().map(|(name, _)| name).collect()
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time bulk container operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_databind::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ConfigValue, SimpleValue};
    use crate::container::ContainerConfig;

    fn sample() -> ValueContainer {
        let mut container = ValueContainer::with_config(ContainerConfig::new().with_name("Audio"));
        container.add("volume", ConfigValue::new(5));
        container.add("muted", SimpleValue::new(false));
        container
    }

    #[test]
    fn test_format_empty() {
        let output = ContainerDebug::new().format(&ValueContainer::new());
        assert!(output.contains("(unnamed)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_format_lists_members_in_order() {
        let output = ContainerDebug::new().format(&sample());
        assert!(output.starts_with("Container Audio (2 values):"));
        let volume = output.find("volume").unwrap();
        let muted = output.find("muted").unwrap();
        assert!(volume < muted);
        assert!(output.contains("(i32)"));
        assert!(output.contains("\u{2514}\u{2500}\u{2500} muted"));
    }

    #[test]
    fn test_format_marks_pending() {
        let mut container = sample();
        container
            .get_mut::<ConfigValue<i32>>("volume")
            .unwrap()
            .set_pending_value(9);

        let output = ContainerDebug::with_options(DebugFormatOptions::detailed()).format(&container);
        assert!(output.contains("*pending*"));
        assert!(output.contains("DEFERRED_UPDATE"));
    }

    #[test]
    fn test_format_minimal() {
        let mut container = sample();
        container
            .get_mut::<ConfigValue<i32>>("volume")
            .unwrap()
            .set_pending_value(9);

        let output = ContainerDebug::with_options(DebugFormatOptions {
            style: DebugStyle::Ascii,
            ..DebugFormatOptions::minimal()
        })
        .format(&container);
        assert!(output.contains("+-- volume\n"));
        assert!(output.contains("`-- muted\n"));
        assert!(!output.contains("pending"));
    }

    #[test]
    fn test_capability_names() {
        let names = capability_names(Capabilities::HISTORY | Capabilities::VISIBILITY);
        assert_eq!(names, vec!["HISTORY", "VISIBILITY"]);
    }

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let _span = PerfSpan::new("test_operation");
        let mut container = sample();
        assert!(container.remove("muted"));
    }
}
