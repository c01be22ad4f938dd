//! Cache Store Module
//!
//! Keyed map of cache items plus the derived memory total. Holds data only;
//! policy (TTL, eviction, counters) lives in [`super::CacheManager`].

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheItem;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-item storage
    items: HashMap<String, CacheItem<V>>,
    /// Next insertion sequence number
    next_seq: u64,
    /// Sum of `size_bytes` over current items
    total_bytes: usize,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            next_seq: 0,
            total_bytes: 0,
        }
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheItem<V>> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheItem<V>> {
        self.items.get_mut(key)
    }

    // == Remove ==
    /// Removes an item and refreshes the memory total.
    pub fn remove(&mut self, key: &str) -> Option<CacheItem<V>> {
        let removed = self.items.remove(key);
        if removed.is_some() {
            self.recompute_memory();
        }
        removed
    }

    /// Removes a batch of keys, refreshing the memory total once.
    ///
    /// Returns how many of the keys were present.
    pub fn remove_many<'a, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let removed = keys
            .into_iter()
            .filter(|key| self.items.remove(key.as_str()).is_some())
            .count();
        self.recompute_memory();
        removed
    }

    // == Clear ==
    /// Empties the store, returning the prior item count.
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        self.total_bytes = 0;
        count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in original insertion order.
    pub fn iter_ordered(&self) -> Vec<&CacheItem<V>> {
        let mut items: Vec<&CacheItem<V>> = self.items.values().collect();
        items.sort_by_key(|item| item.seq);
        items
    }

    pub fn values(&self) -> impl Iterator<Item = &CacheItem<V>> {
        self.items.values()
    }

    /// Sum of `size_bytes` across current items.
    pub fn memory_bytes(&self) -> usize {
        self.total_bytes
    }

    fn recompute_memory(&mut self) {
        self.total_bytes = self.items.values().map(|item| item.size_bytes).sum();
    }
}

impl<V: Serialize> CacheStore<V> {
    // == Insert ==
    /// Inserts or overwrites an item.
    ///
    /// An overwritten key keeps its original insertion position, so recency
    /// ties keep resolving the same way.
    pub fn insert(&mut self, key: String, value: V, ttl: Duration) {
        let seq = match self.items.get(&key) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };

        let item = CacheItem::new(key.clone(), value, ttl, seq);
        self.items.insert(key, item);
        self.recompute_memory();
    }
}
