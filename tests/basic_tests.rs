use expiring_map::{CacheError, ExpiringMap, Ttl, TtlConfig};
use std::time::Duration;

#[test]
fn test_basic_functionality() {
    let map = ExpiringMap::with_ttl(Duration::from_secs(60));
    map.insert("answer", 42);

    assert_eq!(map.get("answer").unwrap(), 42);
    assert!(map.contains("answer"));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_put_overwrites() {
    let map = ExpiringMap::new();
    map.put("k", "first", Ttl::Default);
    map.put("k", "second", Ttl::Never);

    assert_eq!(map.get("k").unwrap(), "second");
    assert_eq!(map.len(), 1);
}

#[test]
fn test_missing_key() {
    let map: ExpiringMap<String, i32> = ExpiringMap::new();

    assert!(matches!(map.get("nope"), Err(CacheError::KeyNotFound)));
    assert_eq!(map.get_opt("nope"), None);
    assert_eq!(map.get_or("nope", -1), -1);
    assert!(!map.contains("nope"));
}

#[test]
fn test_delete_operations() {
    let map = ExpiringMap::new();
    map.insert(1, "one");
    map.insert(2, "two");
    assert_eq!(map.len(), 2);

    map.delete(&1).unwrap();
    assert_eq!(map.len(), 1);
    assert!(matches!(map.delete(&1), Err(CacheError::KeyNotFound)));

    map.clear();
    assert!(map.is_empty());
}

#[test]
fn test_pop_live_and_missing() {
    let map = ExpiringMap::new();
    map.insert("beer", 100);

    assert_eq!(map.pop("beer"), Some(100));
    assert_eq!(map.pop("beer"), None);
    assert_eq!(map.pop_or("beer", 0), 0);
    assert!(map.is_empty());
}

#[test]
fn test_keys_and_values() {
    let map = ExpiringMap::new();
    map.insert("a", 1);
    map.insert("b", 2);

    let mut keys: Vec<_> = map.keys().into_iter().collect();
    keys.sort();
    assert_eq!(keys, vec!["a", "b"]);

    let mut values = map.values();
    values.sort();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn test_with_config() {
    let map: ExpiringMap<&str, i32> =
        ExpiringMap::with_config(&TtlConfig::new().minutes(1)).unwrap();
    assert_eq!(map.default_ttl(), Some(Duration::from_secs(60)));

    let unbounded: ExpiringMap<&str, i32> = ExpiringMap::with_config(&TtlConfig::new()).unwrap();
    assert_eq!(unbounded.default_ttl(), None);
}

#[test]
fn test_with_invalid_config() {
    let result: Result<ExpiringMap<&str, i32>, _> =
        ExpiringMap::with_config(&TtlConfig::new().seconds(-1));
    assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
}
