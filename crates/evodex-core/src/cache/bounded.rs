//! # Bounded LRU
//!
//! Thin counting wrapper over [`lru::LruCache`] shared by both cache tiers.
//!
//! `get` promotes to most-recently-used and counts a hit or a miss.
//! `insert` evicts the least-recently-used entry when the cache is full and
//! counts the eviction. Peeking and membership checks do neither.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// A value together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub value: T,
    pub outcome: CacheOutcome,
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn hit(value: T) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Hit,
        }
    }

    #[must_use]
    pub fn miss(value: T) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Miss,
        }
    }

    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.outcome == CacheOutcome::Hit
    }

    /// Drop the outcome and keep the value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit ratio in whole percent (0 when nothing was looked up).
    #[must_use]
    pub fn hit_percent(&self) -> u64 {
        let total = self.hits.saturating_add(self.misses);
        if total == 0 {
            return 0;
        }
        self.hits.saturating_mul(100) / total
    }
}

/// Fixed-capacity LRU map with hit, miss and eviction counters.
#[derive(Debug)]
pub struct BoundedLru<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq + Clone, V> BoundedLru<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up and promote to most-recently-used. Counts a hit or a miss.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.inner.get(key) {
            Some(value) => {
                self.hits = self.hits.saturating_add(1);
                Some(value)
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Look up without promoting or counting.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    /// Check membership without promoting or counting.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Insert as most-recently-used. Returns the evicted entry, if any.
    ///
    /// Replacing the value of an existing key is not an eviction.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let inserted = key.clone();
        match self.inner.push(key, value) {
            Some((old_key, old_value)) if old_key != inserted => {
                self.evictions = self.evictions.saturating_add(1);
                Some((old_key, old_value))
            }
            _ => None,
        }
    }

    /// Remove one entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Keys from most- to least-recently-used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.inner.iter().map(|(key, _)| key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.inner.len(),
            capacity: self.capacity(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
