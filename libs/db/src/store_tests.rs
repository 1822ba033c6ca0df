use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::codec;
use crate::error::Error;
use crate::options::{Options, SchedulerConfig};
use crate::registry::Registry;
use crate::store::Store;

fn test_registry(dir: &Path) -> Registry {
    let options = Options::new(dir).with_scheduler(SchedulerConfig {
        debounce: Duration::from_millis(10),
        idle_interval: Duration::from_secs(60),
    });
    Registry::open(options).expect("Failed to open registry")
}

fn test_store(registry: &Registry) -> Arc<Store> {
    let store = registry.get_store("testing").expect("Failed to open store");
    store
        .register_columns(&["users"])
        .expect("Failed to register column");
    store
}

#[test]
fn test_put_get_bytes_roundtrip() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    store.put("users", b"Benchmark", b"value").unwrap();
    assert_eq!(store.get_bytes("users", b"Benchmark").unwrap(), b"value");

    registry.close().unwrap();
}

#[test]
fn test_typed_roundtrips() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    store.put_i64("users", b"i", 999999).unwrap();
    assert_eq!(store.get_i64("users", b"i").unwrap(), 999999);

    store.put_i64("users", b"neg", -42).unwrap();
    assert_eq!(store.get_i64("users", b"neg").unwrap(), -42);

    store.put_u64("users", b"u", 999999).unwrap();
    assert_eq!(store.get_u64("users", b"u").unwrap(), 999999);

    store.put_f64("users", b"f", 999.999).unwrap();
    assert_eq!(store.get_f64("users", b"f").unwrap(), 999.999);

    store.put_string("users", b"s", "test").unwrap();
    assert_eq!(store.get_string("users", b"s").unwrap(), "test");

    registry.close().unwrap();
}

#[test]
fn test_absent_keys_return_zero_values() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    assert_eq!(store.get_i64("users", b"missing").unwrap(), 0);
    assert_eq!(store.get_u64("users", b"missing").unwrap(), 0);
    assert_eq!(store.get_f64("users", b"missing").unwrap(), 0.0);
    assert_eq!(store.get_string("users", b"missing").unwrap(), "");
    assert!(store.get_bytes("users", b"missing").unwrap().is_empty());

    registry.close().unwrap();
}

#[test]
fn test_delete_then_get_is_empty() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    store.put("users", b"Benchmark", b"value").unwrap();
    store.delete("users", b"Benchmark").unwrap();
    assert!(store.get_bytes("users", b"Benchmark").unwrap().is_empty());

    registry.close().unwrap();
}

#[test]
fn test_list_visits_in_order_from_seek_key() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    for i in 1..=10i64 {
        store
            .put_i64("users", &codec::encode_i64(i), i)
            .unwrap();
    }

    let mut counter = 0i64;
    store
        .list("users", &codec::encode_i64(1), |_, value| {
            counter += 1;
            assert_eq!(codec::decode_i64(value).unwrap(), counter);
            true
        })
        .unwrap();
    assert_eq!(counter, 10);

    // Seek starts at the first key >= from_key.
    let mut first = None;
    store
        .list("users", &codec::encode_i64(4), |_, value| {
            first = Some(codec::decode_i64(value).unwrap());
            false
        })
        .unwrap();
    assert_eq!(first, Some(4));

    registry.close().unwrap();
}

#[test]
fn test_list_visitor_stops_early() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    for i in 1..=10i64 {
        store
            .put_i64("users", &codec::encode_i64(i), i)
            .unwrap();
    }

    let mut visits = 0;
    store
        .list("users", &codec::encode_i64(1), |_, _| {
            visits += 1;
            visits < 3
        })
        .unwrap();
    assert_eq!(visits, 3);

    registry.close().unwrap();
}

#[test]
fn test_unregistered_column_fails() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = registry.get_store("testing").unwrap();

    assert!(matches!(
        store.put("nope", b"k", b"v"),
        Err(Error::ColumnNotFound(_))
    ));
    assert!(matches!(
        store.get_bytes("nope", b"k"),
        Err(Error::ColumnNotFound(_))
    ));
    assert!(matches!(
        store.list("nope", b"", |_, _| true),
        Err(Error::ColumnNotFound(_))
    ));

    registry.close().unwrap();
}

#[test]
fn test_register_columns_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    let first = store.column_family("users").unwrap();
    store.register_columns(&["users"]).unwrap();
    let second = store.column_family("users").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    registry.close().unwrap();
}

#[test]
fn test_column_names_sorted() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = registry.get_store("testing").unwrap();

    store.register_columns(&["b", "c", "a"]).unwrap();
    assert_eq!(store.column_names(), vec!["a", "b", "c"]);

    registry.close().unwrap();
}

#[test]
fn test_operations_fail_after_close() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    store.close().unwrap();
    assert!(matches!(store.put("users", b"k", b"v"), Err(Error::Closed)));
    assert!(matches!(store.get_i64("users", b"k"), Err(Error::Closed)));
    assert!(matches!(store.register_columns(&["users"]), Err(Error::Closed)));

    // Second close must not panic or double-release.
    store.close().unwrap();
    registry.close().unwrap();
}

#[test]
fn test_typed_get_of_malformed_value_is_codec_error() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());
    let store = test_store(&registry);

    store.put("users", b"short", b"xyz").unwrap();
    assert!(matches!(
        store.get_i64("users", b"short"),
        Err(Error::Codec(_))
    ));

    registry.close().unwrap();
}

#[test]
fn test_scenario_users_column() {
    let dir = TempDir::new().unwrap();
    let registry = test_registry(dir.path());

    let store = registry.get_store("testing").unwrap();
    store.register_columns(&["users"]).unwrap();

    let key = codec::encode_i64(1);
    store.put_i64("users", &key, 42).unwrap();
    assert_eq!(store.get_i64("users", &key).unwrap(), 42);

    store.delete("users", &key).unwrap();
    assert_eq!(store.get_i64("users", &key).unwrap(), 0);

    registry.close().unwrap();
}
