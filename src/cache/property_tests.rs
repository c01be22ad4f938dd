//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the counter, capacity, memory-accounting and
//! forced-cleanup invariants over arbitrary operation sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::cache::{CacheCategory, CacheManager};

// == Test Configuration ==
const TEST_MAX_ITEMS: usize = 100;

// == Strategies ==
/// Generates keys from a small pool so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "(pages|stats|quick):[a-e]{1,2}|[a-e]{1,3}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,64}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(|v| json!(v)),
    ]
}

/// A single cache operation for sequence testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
    ForceCleanup,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Has { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::ForceCleanup),
    ]
}

fn apply(cache: &mut CacheManager<Value>, op: CacheOp) {
    match op {
        CacheOp::Set { key, value } => {
            let _ = cache.set(key, value, None, Some(CacheCategory::Pages));
        }
        CacheOp::Get { key } => {
            let _ = cache.get(&key);
        }
        CacheOp::Has { key } => {
            let _ = cache.has(&key);
        }
        CacheOp::Delete { key } => {
            let _ = cache.delete(&key);
        }
        CacheOp::ForceCleanup => {
            let _ = cache.force_cleanup();
        }
    }
}

fn item_size_sum(cache: &CacheManager<Value>) -> usize {
    cache.store().values().map(|item| item.size_bytes).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // hits + misses equals the number of get() calls; has() never counts
    #[test]
    fn prop_hit_miss_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut cache = CacheManager::with_capacity(TEST_MAX_ITEMS);
        let mut gets: u64 = 0;
        let mut expected_hits: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Get { key } => {
                    gets += 1;
                    if cache.get(&key).is_some() {
                        expected_hits += 1;
                    }
                }
                other => apply(&mut cache, other),
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, gets);
        prop_assert_eq!(stats.hits, expected_hits);
    }

    // Estimated memory always equals the sum of current items' sizes
    #[test]
    fn prop_memory_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut cache = CacheManager::with_capacity(8);

        for op in ops {
            apply(&mut cache, op);
            prop_assert_eq!(cache.memory_bytes(), item_size_sum(&cache));
        }

        cache.clear();
        prop_assert_eq!(cache.memory_bytes(), 0);
    }

    // The item count never exceeds capacity and each over-capacity insert evicts once.
    // A requested capacity of 0 behaves as 1.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec("[a-z]{1,6}", 1..200),
        requested in 0usize..20
    ) {
        let mut cache: CacheManager<Value> = CacheManager::with_capacity(requested);
        let max_items = requested.max(1);

        for key in keys {
            let before = cache.len();
            let evictions_before = cache.counters().evictions;
            cache.set(key, json!(1), None, None).unwrap();

            prop_assert!(cache.len() <= max_items);
            let expected = if before >= max_items { 1 } else { 0 };
            prop_assert_eq!(cache.counters().evictions - evictions_before, expected);
        }
    }

    // forceCleanup keeps exactly ceil(N/2) items
    #[test]
    fn prop_force_cleanup_halves(keys in prop::collection::hash_set("[a-z]{1,8}", 0..60)) {
        let mut cache: CacheManager<Value> = CacheManager::with_capacity(TEST_MAX_ITEMS);
        for key in &keys {
            cache.set(key.clone(), json!(key), None, None).unwrap();
        }

        let total = cache.len();
        let removed = cache.force_cleanup();

        prop_assert_eq!(cache.len(), total.div_ceil(2));
        prop_assert_eq!(removed, total / 2);
        prop_assert_eq!(cache.counters().forced_removals, removed as u64);
        prop_assert_eq!(cache.counters().evictions, 0);
        prop_assert_eq!(cache.memory_bytes(), item_size_sum(&cache));
    }

    // Distinct timestamps: the retained set is exactly the most recently read half
    #[test]
    fn prop_force_cleanup_retains_recent_half(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..12)
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut cache: CacheManager<Value> = CacheManager::with_capacity(TEST_MAX_ITEMS);
        for key in &keys {
            cache.set(key.clone(), json!(1), None, None).unwrap();
        }
        // Reads in order, each with a later timestamp than the previous one
        for (i, key) in keys.iter().enumerate() {
            cache.get(key);
            cache.store_mut().get_mut(key).unwrap().last_accessed = 1_000 + i as u64;
        }

        cache.force_cleanup();

        let keep = keys.len().div_ceil(2);
        let expected: HashSet<&String> = keys.iter().rev().take(keep).collect();
        let retained: HashSet<&String> = keys.iter().filter(|k| cache.has(k)).collect();
        prop_assert_eq!(retained, expected);
    }
}

// == Concurrent access through the shared lock ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_shared_cache_stays_consistent(ops in prop::collection::vec(cache_op_strategy(), 10..50)) {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        let total_gets = ops.iter().filter(|op| matches!(op, CacheOp::Get { .. })).count() as u64;

        let (stats, memory, sum) = tokio_test::block_on(async move {
            let cache = Arc::new(RwLock::new(CacheManager::<Value>::with_capacity(16)));

            let handles: Vec<_> = ops
                .into_iter()
                .map(|op| {
                    let cache = Arc::clone(&cache);
                    tokio::spawn(async move {
                        let mut guard = cache.write().await;
                        apply(&mut guard, op);
                    })
                })
                .collect();

            for handle in handles {
                handle.await.expect("task should not panic");
            }

            let guard = cache.read().await;
            (guard.stats(), guard.memory_bytes(), item_size_sum(&guard))
        });

        prop_assert_eq!(stats.hits + stats.misses, total_gets);
        prop_assert!(stats.total_items <= 16);
        prop_assert_eq!(memory, sum);
    }
}
