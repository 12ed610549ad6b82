//! Horizon Databind - capability-composable value binding for tool UIs.
//!
//! This is the umbrella crate. It re-exports everything from
//! `horizon_databind_core` and adds ready-made [`factories`] for the common
//! widget shapes.
//!
//! # Example
//!
//! ```
//! use horizon_databind::prelude::*;
//!
//! let mut settings = ValueContainer::with_config(ContainerConfig::new().with_name("Render"));
//! settings.add("exposure", factories::config_slider(0.0_f32, 4.0, 1.0));
//! settings.add("bloom", factories::config_toggle(true));
//!
//! let exposure = settings.get_mut::<ConfigValue<f32>>("exposure").unwrap();
//! exposure.set_pending_value(2.5);
//! assert!(settings.has_pending_changes());
//!
//! settings.apply_all();
//! assert_eq!(*settings.get::<ConfigValue<f32>>("exposure").unwrap().value(), 2.5);
//! ```

pub use horizon_databind_core::*;

pub mod factories;
pub mod prelude;
