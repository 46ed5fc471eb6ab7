//! Bounded, content-addressed image cache.
//!
//! Used by the consuming client to memoize fetched image payloads across
//! re-renders. Keys are SHA-256 digests of the payload, so identical bytes
//! share one entry regardless of URL. Capacity is explicit; the least
//! recently used entry is evicted when it is exceeded.

use indexmap::IndexMap;
use panora_core::hashing::sha256_hex;

/// LRU cache of raw image payloads.
///
/// Insertion order doubles as recency order: lookups move the entry to the
/// back, eviction pops the front.
pub struct ImageCache {
    capacity: usize,
    entries: IndexMap<String, Vec<u8>>,
}

impl ImageCache {
    /// Create a cache holding at most `capacity` images.
    ///
    /// A zero capacity is treated as one; a cache that can hold nothing
    /// has no reason to exist.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: IndexMap::new(),
        }
    }

    /// Store a payload, returning its content key.
    ///
    /// Re-inserting identical bytes refreshes recency instead of growing
    /// the cache.
    pub fn insert(&mut self, payload: Vec<u8>) -> String {
        let key = sha256_hex(&payload);
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key.clone(), payload);
        key
    }

    /// Look up a payload by content key, refreshing its recency.
    pub fn get(&mut self, key: &str) -> Option<&[u8]> {
        let payload = self.entries.shift_remove(key)?;
        self.entries.insert(key.to_string(), payload);
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
