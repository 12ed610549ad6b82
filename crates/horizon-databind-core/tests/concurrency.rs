//! Cross-thread reads and writes through monitored values and handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use horizon_databind_core::{FullValue, MonitoredValue, ValueContainer, ValueSource};

/// Every write stores an array whose lanes must all agree.
#[test]
fn readers_never_observe_torn_values() {
    let value = MonitoredValue::new([0u64; 4]);
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = value.handle();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut reads = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    let Some(seen) = handle.get() else {
                        break;
                    };
                    assert!(seen.iter().all(|lane| *lane == seen[0]), "torn read: {seen:?}");
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for i in 1..=2_000u64 {
        value.set([i; 4]);
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(value.get(), [2_000; 4]);
}

#[test]
fn concurrent_writers_through_handles() {
    let value = MonitoredValue::new(0usize);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    value.add_simple_change_listener(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let handle = value.handle();
            thread::spawn(move || {
                for i in 0..250 {
                    handle.set(t * 1_000 + i + 1).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(notified.load(Ordering::SeqCst), 1_000);
    assert_eq!(value.last_source(), ValueSource::User);
}

#[test]
fn listener_may_read_value_it_was_notified_about() {
    let value = Arc::new(MonitoredValue::new(0));
    let observed = Arc::new(AtomicUsize::new(0));

    let reader = value.handle();
    let sink = observed.clone();
    value.add_change_listener(move |_old: &i32, new: &i32| {
        // Listeners run after the write lock is released.
        assert_eq!(reader.get(), Some(*new));
        sink.fetch_add(1, Ordering::SeqCst);
    });

    let writer = value.clone();
    thread::spawn(move || writer.set(7)).join().unwrap();
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[test]
fn handle_outlives_container_slot() {
    let mut container = ValueContainer::new();
    container.add("speed", FullValue::new(1.0f32));
    let handle = container.get::<FullValue<f32>>("speed").unwrap().handle();

    let worker = {
        let handle = handle.clone();
        thread::spawn(move || handle.set(2.5))
    };
    assert_eq!(worker.join().unwrap(), Ok(true));
    assert_eq!(handle.get(), Some(2.5));

    assert!(container.remove("speed"));
    assert!(!handle.is_alive());
    assert_eq!(handle.get(), None);
    assert!(handle.set(3.0).is_err());
}

/// A setter that stalls on one value must not let that value land on the
/// external side after a newer write.
fn stalling_setter(external: &Arc<Mutex<i32>>) -> impl Fn(&i32) + Send + Sync + 'static {
    let external = external.clone();
    move |v: &i32| {
        if *v == 1 {
            thread::sleep(Duration::from_millis(200));
        }
        *external.lock() = *v;
    }
}

#[test]
fn external_owner_ends_on_latest_monitored_write() {
    let external = Arc::new(Mutex::new(0));
    let source = external.clone();
    let value = MonitoredValue::new_bound(move || *source.lock(), stalling_setter(&external), 0);

    let slow = {
        let handle = value.handle();
        thread::spawn(move || handle.set(1))
    };
    thread::sleep(Duration::from_millis(50));
    value.set(2);
    slow.join().unwrap().unwrap();

    assert_eq!(*external.lock(), value.get());
}

#[test]
fn external_owner_ends_on_latest_full_write() {
    let external = Arc::new(Mutex::new(0));
    let value = FullValue::new(0);
    value.set_setter(stalling_setter(&external));

    let slow = {
        let handle = value.handle();
        thread::spawn(move || handle.set(1))
    };
    thread::sleep(Duration::from_millis(50));
    value.set(2).unwrap();
    slow.join().unwrap().unwrap();

    assert_eq!(*external.lock(), value.get());
}
