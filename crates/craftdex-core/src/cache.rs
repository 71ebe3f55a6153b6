//! Least-recently-used result cache.
//!
//! Values are handed out as `Arc`s so callers can filter and paginate a
//! cached result without holding the cache lock. A capacity of 0 disables
//! eviction entirely.

use ahash::AHashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::shape::NormalizedShape;

/// Key for the crafting query cache: the serialized canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// The serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&NormalizedShape> for CacheKey {
    fn from(shape: &NormalizedShape) -> Self {
        Self(shape.to_string())
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

#[derive(Debug)]
struct Slot<V> {
    value: Arc<V>,
    last_used: u64,
}

/// Bounded map with least-recently-used eviction.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: AHashMap<K, Slot<V>>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create a cache holding at most `capacity` entries (0 = unbounded).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: AHashMap::new(),
            capacity,
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Look up an entry, marking it as recently used.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        self.clock += 1;
        match self.entries.get_mut(key) {
            Some(slot) => {
                slot.last_used = self.clock;
                self.stats.hits += 1;
                debug!("Cache hit for {:?}", key);
                Some(Arc::clone(&slot.value))
            },
            None => {
                self.stats.misses += 1;
                debug!("Cache miss for {:?}", key);
                None
            },
        }
    }

    /// Insert or replace an entry, evicting the least recently used entry
    /// when full. Returns the stored value.
    pub fn put(&mut self, key: K, value: V) -> Arc<V> {
        self.clock += 1;
        let value = Arc::new(value);

        if self.capacity > 0
            && !self.entries.contains_key(&key)
            && self.entries.len() >= self.capacity
        {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            Slot {
                value: Arc::clone(&value),
                last_used: self.clock,
            },
        );
        value
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
            debug!("Evicted cache entry {:?}", key);
        }
    }

    /// Check for an entry without touching recency or counters.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit, miss, and eviction counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_put() {
        let mut cache: LruCache<&str, u32> = LruCache::new(4);
        assert!(cache.get(&"a").is_none());
        cache.put("a", 1);
        assert_eq!(cache.get(&"a").as_deref(), Some(&1));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get(&"a").is_some());
        cache.put("c", 3);

        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
        assert!(cache.contains(&"c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_replace_does_not_evict() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a").as_deref(), Some(&10));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut cache = LruCache::new(0);
        for i in 0..100u32 {
            cache.put(i, i);
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_cache_key_from_shape() {
        use crate::shape::{normalize, Grid};
        let a = normalize(&Grid::from_flat(&[1, 0, 0, 1, 0, 0, 0, 0, 0]).expect("nine"));
        let b = normalize(&Grid::from_flat(&[0, 0, 0, 0, 0, 1, 0, 0, 1]).expect("nine"));
        assert_eq!(CacheKey::from(&a), CacheKey::from(&b));
        assert_eq!(CacheKey::from(&a).as_str(), "1;1");
    }
}
