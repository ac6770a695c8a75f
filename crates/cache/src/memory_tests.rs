use std::sync::Arc;

use crate::MemoryCache;

fn bytes(len: usize) -> Vec<u8> {
    vec![7_u8; len]
}

#[test]
fn test_put_then_get_returns_value() {
    let cache: MemoryCache<String, String> = MemoryCache::new("test", 1024);
    cache.put("k".to_owned(), "value".to_owned());
    assert_eq!(cache.get("k").as_deref(), Some("value"));
}

#[test]
fn test_repeated_get_is_stable() {
    let cache: MemoryCache<String, String> = MemoryCache::new("test", 1024);
    cache.put("k".to_owned(), "value".to_owned());
    let first = cache.get("k");
    let second = cache.get("k");
    assert_eq!(first, second);
}

#[test]
fn test_miss_returns_none() {
    let cache: MemoryCache<String, String> = MemoryCache::new("test", 1024);
    assert_eq!(cache.get("missing"), None);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_put_replaces_and_reweighs() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 100);
    cache.put("k".to_owned(), bytes(40));
    cache.put("k".to_owned(), bytes(10));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.weighted_size(), 10);
    assert_eq!(cache.get("k").map(|v| v.len()), Some(10));
}

#[test]
fn test_evicts_least_recently_inserted_without_reads() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 30);
    cache.put("a".to_owned(), bytes(10));
    cache.put("b".to_owned(), bytes(10));
    cache.put("c".to_owned(), bytes(10));
    cache.put("d".to_owned(), bytes(10));

    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
    assert!(cache.contains("d"));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_read_protects_entry_from_eviction() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 30);
    cache.put("a".to_owned(), bytes(10));
    cache.put("b".to_owned(), bytes(10));
    cache.put("c".to_owned(), bytes(10));

    assert!(cache.get("a").is_some());
    cache.put("d".to_owned(), bytes(10));

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert!(cache.contains("d"));
}

#[test]
fn test_large_insert_evicts_several() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 30);
    cache.put("a".to_owned(), bytes(10));
    cache.put("b".to_owned(), bytes(10));
    cache.put("c".to_owned(), bytes(10));
    cache.put("big".to_owned(), bytes(25));

    assert_eq!(cache.len(), 1);
    assert!(cache.contains("big"));
    assert_eq!(cache.weighted_size(), 25);
}

#[test]
fn test_just_written_key_survives_when_all_others_were_read() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 20);
    cache.put("a".to_owned(), bytes(10));
    cache.put("b".to_owned(), bytes(10));
    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_some());

    cache.put("c".to_owned(), bytes(10));

    assert!(cache.contains("c"));
    assert_eq!(cache.len(), 2);
    assert!(cache.weighted_size() <= cache.capacity());
}

#[test]
fn test_oversized_value_is_rejected() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 10);
    cache.put("small".to_owned(), bytes(5));
    cache.put("huge".to_owned(), bytes(11));

    assert!(!cache.contains("huge"));
    assert!(cache.contains("small"));
    assert_eq!(cache.stats().rejections, 1);
}

#[test]
fn test_oversized_replacement_drops_previous_value() {
    let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new("test", 10);
    cache.put("k".to_owned(), bytes(5));
    cache.put("k".to_owned(), bytes(50));

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.weighted_size(), 0);
}

#[test]
fn test_weighted_size_never_exceeds_capacity() {
    let cache: MemoryCache<u32, Vec<u8>> = MemoryCache::new("test", 100);
    for i in 0..200_u32 {
        cache.put(i, bytes((i as usize % 17) + 1));
        if i % 3 == 0 {
            let _ = cache.get(&(i / 2));
        }
        assert!(cache.weighted_size() <= 100, "over capacity after inserting {i}");
    }
}

#[test]
fn test_clear_evicts_everything() {
    let cache: MemoryCache<String, String> = MemoryCache::new("test", 1024);
    cache.put("a".to_owned(), "1".to_owned());
    cache.put("b".to_owned(), "2".to_owned());

    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.weighted_size(), 0);
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
}

#[test]
fn test_remove_returns_value() {
    let cache: MemoryCache<String, String> = MemoryCache::new("test", 1024);
    cache.put("a".to_owned(), "1".to_owned());
    assert_eq!(cache.remove("a").as_deref(), Some("1"));
    assert_eq!(cache.weighted_size(), 0);
    assert_eq!(cache.remove("a"), None);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let cache: Arc<MemoryCache<u32, Vec<u8>>> = Arc::new(MemoryCache::new("test", 500));

    std::thread::scope(|scope| {
        for worker in 0..4_u32 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500_u32 {
                    let key = worker * 1000 + i;
                    cache.put(key, bytes(10));
                    let _ = cache.get(&key);
                    let _ = cache.get(&(key.saturating_sub(3)));
                }
            });
        }
    });

    assert!(cache.weighted_size() <= 500);
    assert_eq!(cache.len() * 10, cache.weighted_size());
}
