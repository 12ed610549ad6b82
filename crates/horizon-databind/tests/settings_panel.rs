//! A settings panel assembled from factories and builders.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use horizon_databind::logging::ContainerDebug;
use horizon_databind::prelude::*;

#[derive(Debug)]
struct Renderer {
    vsync: bool,
    gamma: f32,
}

fn panel(renderer: &Arc<RwLock<Renderer>>) -> ValueContainer {
    let mut panel = ValueContainer::with_config(ContainerConfig::new().with_name("Renderer"));

    panel.add(
        "vsync",
        factories::monitored_field(renderer, |r| r.vsync, |r, v| r.vsync = v, false),
    );
    make_builder(factories::config_slider(1.0_f32, 3.0, 2.2))
        .with_name("Gamma")
        .with_validator(|v: &f32| {
            if (1.0..=3.0).contains(v) {
                Ok(*v)
            } else {
                Err("gamma out of range".into())
            }
        })
        .add_to(&mut panel, "gamma");
    make_builder(factories::full(4))
        .with_name("Samples")
        .with_max_history_size(3)
        .advanced()
        .add_to(&mut panel, "samples");
    panel.add("quality", factories::simple_combo(["Low", "High"], 1));
    panel
}

#[test]
fn monitored_field_reflects_owner() {
    let renderer = Arc::new(RwLock::new(Renderer {
        vsync: true,
        gamma: 2.2,
    }));
    let mut panel = panel(&renderer);

    let vsync = panel.get::<MonitoredValue<bool>>("vsync").unwrap();
    assert!(vsync.get());
    vsync.set(false);
    assert!(!renderer.read().vsync);

    renderer.write().vsync = true;
    assert_eq!(panel.sync_all_from_external(), 1);
    assert!(panel.get::<MonitoredValue<bool>>("vsync").unwrap().get());
    assert_eq!(renderer.read().gamma, 2.2);
}

#[test]
fn builder_settings_survive_container_insertion() {
    let renderer = Arc::new(RwLock::new(Renderer {
        vsync: false,
        gamma: 2.2,
    }));
    let mut panel = panel(&renderer);

    let gamma = panel.get_mut::<ConfigValue<f32>>("gamma").unwrap();
    assert_eq!(gamma.name(), "Gamma");
    assert_eq!(gamma.hints().range, Some((1.0, 3.0)));
    assert!(gamma.try_set(5.0).is_err());
    assert!(gamma.try_set(1.8).is_ok());

    let samples = panel.query::<dyn VisibilityControl>("samples").unwrap();
    assert!(samples.is_advanced());
    assert!(panel.has_advanced_values());
    assert_eq!(panel.get::<FullValue<i32>>("samples").unwrap().max_history_size(), 3);

    assert!(panel.has_pending_changes());
    assert_eq!(panel.apply_all(), 1);
    assert_eq!(*panel.get::<ConfigValue<f32>>("gamma").unwrap().value(), 1.8);
}

#[test]
fn on_change_fires_through_builder() {
    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    let value = make_builder(factories::full(String::from("draft")))
        .on_change(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    value.set_with_validation("final".to_string()).unwrap();
    assert_eq!(changes.load(Ordering::SeqCst), 0);
    assert!(value.apply_with_history());
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(value.undo(), Some("draft".to_string()));
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn debug_dump_lists_panel_in_order() {
    let renderer = Arc::new(RwLock::new(Renderer {
        vsync: false,
        gamma: 2.2,
    }));
    let panel = panel(&renderer);

    let dump = ContainerDebug::new().format(&panel);
    assert!(dump.starts_with("Container Renderer (4 values):"));
    let positions: Vec<usize> = ["vsync", "gamma", "samples", "quality"]
        .iter()
        .map(|id| dump.find(id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}
