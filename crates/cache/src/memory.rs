//! Cost-bounded LRU cache safe for concurrent readers and writers.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lru::LruCache;

use crate::stats::{CacheStats, CacheStatsSnapshot};
use crate::CacheWeight;

struct Entry<V> {
    value: V,
    weight: usize,
    /// Set by readers under the shared lock; consumed by the next eviction pass.
    referenced: AtomicBool,
}

impl<V> Entry<V> {
    fn new(value: V, weight: usize) -> Self {
        Self { value, weight, referenced: AtomicBool::new(false) }
    }

    fn take_reference(&self) -> bool {
        self.referenced.swap(false, Ordering::Relaxed)
    }
}

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<K, Entry<V>>,
    weighted_size: usize,
}

impl<K: Hash + Eq, V> Inner<K, V> {
    /// Evicts from the cold end until the total cost fits `capacity`.
    ///
    /// Entries read since they were last considered get a second chance and
    /// move to the hot end. `protected` (the key just written) is never the
    /// victim while other entries remain.
    fn evict_over(&mut self, capacity: usize, protected: &K) -> u64 {
        let mut evicted = 0_u64;
        while self.weighted_size > capacity {
            let Some((key, entry)) = self.entries.pop_lru() else {
                break;
            };
            let others_remain = !self.entries.is_empty();
            if others_remain && (key == *protected || entry.take_reference()) {
                let _ = self.entries.push(key, entry);
                continue;
            }
            self.weighted_size = self.weighted_size.saturating_sub(entry.weight);
            evicted += 1;
        }
        evicted
    }
}

/// Size-bounded key/value cache with least-recently-used eviction.
///
/// Capacity is a cost budget fixed at construction; each value's cost comes
/// from [`CacheWeight`]. Lookups take a shared lock so readers never block
/// each other; `put` and `clear` take the exclusive lock. Locks are only held
/// for the duration of a single operation.
pub struct MemoryCache<K: Hash + Eq, V> {
    name: &'static str,
    capacity: usize,
    inner: RwLock<Inner<K, V>>,
    stats: CacheStats,
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + CacheWeight,
{
    /// Creates an empty cache holding at most `capacity` cost units.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            inner: RwLock::new(Inner { entries: LruCache::unbounded(), weighted_size: 0 }),
            stats: CacheStats::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clone of the cached value, marking it recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let inner = self.read();
        match inner.entries.peek(key) {
            Some(entry) => {
                entry.referenced.store(true, Ordering::Relaxed);
                self.stats.record_hit();
                Some(entry.value.clone())
            },
            None => {
                self.stats.record_miss();
                None
            },
        }
    }

    /// Inserts or replaces `key`, evicting cold entries to stay within capacity.
    ///
    /// A value whose cost alone exceeds the capacity is not stored, and any
    /// previous value under the same key is dropped.
    pub fn put(&self, key: K, value: V) {
        let weight = value.cache_weight().max(1);
        let mut inner = self.write();

        if weight > self.capacity {
            if let Some(previous) = inner.entries.pop(&key) {
                inner.weighted_size = inner.weighted_size.saturating_sub(previous.weight);
            }
            drop(inner);
            self.stats.record_rejection();
            tracing::debug!(cache = self.name, weight, capacity = self.capacity, "value larger than cache, not stored");
            return;
        }

        if let Some(previous) = inner.entries.put(key.clone(), Entry::new(value, weight)) {
            inner.weighted_size = inner.weighted_size.saturating_sub(previous.weight);
        }
        inner.weighted_size += weight;
        let evicted = inner.evict_over(self.capacity, &key);
        drop(inner);

        self.stats.record_insertion();
        self.stats.record_evictions(evicted);
        if evicted > 0 {
            tracing::trace!(cache = self.name, evicted, "evicted cold entries");
        }
    }

    /// Removes a single entry, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.write();
        let entry = inner.entries.pop(key)?;
        inner.weighted_size = inner.weighted_size.saturating_sub(entry.weight);
        Some(entry.value)
    }

    /// Evicts everything.
    pub fn clear(&self) {
        let mut inner = self.write();
        let cleared = inner.entries.len();
        inner.entries.clear();
        inner.weighted_size = 0;
        drop(inner);
        tracing::debug!(cache = self.name, cleared, "cache cleared");
    }

    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().entries.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the costs of all cached values.
    #[must_use]
    pub fn weighted_size(&self) -> usize {
        self.read().weighted_size
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        let inner = self.read();
        self.stats.snapshot(inner.entries.len(), inner.weighted_size)
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for MemoryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
