use expiring_map::{CacheError, ExpiringMap, Memoizer, TtlConfig};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

#[test]
fn test_key_not_found_message() {
    let map: ExpiringMap<i32, i32> = ExpiringMap::new();
    let err = map.get(&404).unwrap_err();
    assert!(matches!(err, CacheError::KeyNotFound));
    assert_eq!(err.to_string(), "key not found");
}

#[test]
fn test_failed_operations_do_not_mutate() {
    let map = ExpiringMap::new();
    map.insert(1, "one");

    assert!(map.delete(&2).is_err());
    assert!(map.set_expiration(&2, SystemTime::now()).is_err());
    assert_eq!(map.len(), 1);
    assert!(!map.contains(&2));
}

#[test]
fn test_lenient_reads_never_fail() {
    let map: ExpiringMap<i32, &str> = ExpiringMap::new();
    assert_eq!(map.get_or(&1, "fallback"), "fallback");
    assert_eq!(map.get_opt(&1), None);
    assert_eq!(map.pop_or(&1, "fallback"), "fallback");
    assert_eq!(map.pop(&1), None);
}

#[test]
fn test_invalid_config_errors() {
    let negative = Memoizer::<i32>::new(&TtlConfig::new().hours(-1));
    match negative {
        Err(CacheError::InvalidConfiguration(message)) => assert!(message.contains("hours")),
        other => panic!("expected invalid configuration, got {:?}", other),
    }

    let overflow = Memoizer::<i32>::new(&TtlConfig::new().days(i64::MAX));
    assert!(matches!(overflow, Err(CacheError::InvalidConfiguration(_))));
}

#[test]
fn test_serialization_error_surfaces() {
    let memo: Memoizer<i32> = Memoizer::with_ttl(Duration::from_secs(1));
    let mut args = HashMap::new();
    args.insert(vec![1], 1);

    let err = memo.get_or_compute(&args, || 0).unwrap_err();
    assert!(matches!(err, CacheError::Serialization(_)));
    assert!(err.to_string().starts_with("failed to serialize"));
}

#[test]
fn test_unset_config_never_expires() {
    let memo: Memoizer<i32> = Memoizer::new(&TtlConfig::new()).unwrap();
    memo.get_or_compute(&1, || 1).unwrap();
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(memo.get_or_compute(&1, || 2).unwrap(), 1);
}
