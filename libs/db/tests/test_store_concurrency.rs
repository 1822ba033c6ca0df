//! Concurrent registration and access across caller threads.

use std::sync::{Arc, Barrier};
use std::time::Duration;

use strata_db::{Options, Registry, SchedulerConfig};
use tempfile::TempDir;

fn fast_options(dir: &std::path::Path) -> Options {
    Options::new(dir).with_scheduler(SchedulerConfig {
        debounce: Duration::from_millis(10),
        idle_interval: Duration::from_secs(60),
    })
}

#[test]
fn test_concurrent_register_same_column_opens_one_handle() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::open(fast_options(dir.path())).unwrap();
    let store = registry.get_store("testing").unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                store.register_columns(&["users"]).unwrap();
                store.column_family("users").unwrap()
            })
        })
        .collect();

    let columns: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Every losing caller gets the winner's handle, not an error.
    for cf in &columns[1..] {
        assert!(Arc::ptr_eq(&columns[0], cf));
    }
    assert_eq!(store.column_names(), vec!["users"]);

    registry.close().unwrap();
}

#[test]
fn test_concurrent_register_distinct_columns() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::open(fast_options(dir.path())).unwrap();
    let store = registry.get_store("testing").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                let name = format!("col-{}", i);
                store.register_columns(&[name.as_str()]).unwrap();
                store.put(&name, b"k", b"v").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        store.column_names(),
        vec!["col-0", "col-1", "col-2", "col-3"]
    );

    registry.close().unwrap();
}

#[test]
fn test_concurrent_writers_single_column() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::open(fast_options(dir.path())).unwrap();
    let store = registry.get_store("testing").unwrap();
    store.register_columns(&["users"]).unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..50u64 {
                    let key = strata_db::encode_u64(t * 1000 + i);
                    store.put_u64("users", &key, t * 1000 + i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut count = 0;
    store
        .list("users", b"", |_, _| {
            count += 1;
            true
        })
        .unwrap();
    assert_eq!(count, 200);

    registry.close().unwrap();
}
