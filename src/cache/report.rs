//! Read-only cache aggregates: summary stats and the detailed report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{group_of, CacheItem, CacheManager, ItemSummary};

/// Number of entries in the hot and cold lists.
const TOP_ITEMS: usize = 10;

/// Summary returned by `CacheManager::stats`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub forced_removals: u64,
    /// hits / (hits + misses), 0.0 before any read
    pub hit_rate: f64,
    pub total_items: usize,
    pub max_items: usize,
    pub memory_bytes: usize,
    /// `memory_bytes` in MB, 2 decimals
    pub memory_mb: f64,
}

/// Per key-prefix aggregate.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CategoryReport {
    pub count: usize,
    pub total_size_bytes: usize,
    pub avg_access_count: f64,
}

/// Full breakdown returned by `CacheManager::detailed_report`.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedCacheReport {
    pub generated_at: DateTime<Utc>,
    pub stats: CacheStatsSnapshot,
    /// Keyed by the text before the first `:` of each key, or `"other"`
    pub categories: BTreeMap<String, CategoryReport>,
    /// Most-read items, highest `access_count` first
    pub hot_items: Vec<ItemSummary>,
    /// Least-read items, lowest `access_count` first
    pub cold_items: Vec<ItemSummary>,
}

impl<V> CacheManager<V> {
    // == Stats ==
    pub fn stats(&self) -> CacheStatsSnapshot {
        let counters = self.counters();
        CacheStatsSnapshot {
            hits: counters.hits,
            misses: counters.misses,
            sets: counters.sets,
            deletes: counters.deletes,
            evictions: counters.evictions,
            forced_removals: counters.forced_removals,
            hit_rate: counters.hit_rate(),
            total_items: self.len(),
            max_items: self.config().max_items,
            memory_bytes: self.memory_bytes(),
            memory_mb: round2(self.memory_mb()),
        }
    }

    // == Detailed Report ==
    /// Groups items by key prefix and lists the hottest and coldest items.
    ///
    /// Ties on `access_count` are listed in insertion order.
    pub fn detailed_report(&self) -> DetailedCacheReport {
        let items = self.store().iter_ordered();

        let mut categories: BTreeMap<String, (CategoryReport, u64)> = BTreeMap::new();
        for item in &items {
            let (report, accesses) = categories.entry(group_of(&item.key).to_string()).or_default();
            report.count += 1;
            report.total_size_bytes += item.size_bytes;
            *accesses += item.access_count;
        }
        let categories = categories
            .into_iter()
            .map(|(name, (mut report, accesses))| {
                report.avg_access_count = round2(accesses as f64 / report.count as f64);
                (name, report)
            })
            .collect();

        let mut hot: Vec<&CacheItem<V>> = items.clone();
        hot.sort_by(|a, b| b.access_count.cmp(&a.access_count));
        let mut cold = items;
        cold.sort_by_key(|item| item.access_count);

        DetailedCacheReport {
            generated_at: Utc::now(),
            stats: self.stats(),
            categories,
            hot_items: hot.into_iter().take(TOP_ITEMS).map(ItemSummary::from).collect(),
            cold_items: cold.into_iter().take(TOP_ITEMS).map(ItemSummary::from).collect(),
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn populated() -> CacheManager<Value> {
        let mut cache = CacheManager::with_capacity(100);
        cache.set("pages:a", json!("aaaa"), None, None).unwrap();
        cache.set("pages:b", json!("bb"), None, None).unwrap();
        cache.set("api_keys:x", json!(1), None, None).unwrap();
        cache.set("loose", json!(true), None, None).unwrap();

        for _ in 0..3 {
            cache.get("pages:a");
        }
        cache.get("api_keys:x");
        cache
    }

    #[test]
    fn test_stats_snapshot() {
        let mut cache = populated();
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 4);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 4);
        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.max_items, 100);
        assert_eq!(stats.memory_bytes, 6 + 4 + 1 + 4);
        assert_eq!(stats.hit_rate, 0.8);
    }

    #[test]
    fn test_categories_grouped_by_prefix() {
        let report = populated().detailed_report();

        let pages = &report.categories["pages"];
        assert_eq!(pages.count, 2);
        assert_eq!(pages.total_size_bytes, 10);
        assert_eq!(pages.avg_access_count, 1.5);

        assert_eq!(report.categories["api_keys"].avg_access_count, 1.0);
        assert_eq!(report.categories["other"].count, 1);
        assert_eq!(report.categories.len(), 3);
    }

    #[test]
    fn test_hot_and_cold_lists() {
        let report = populated().detailed_report();

        let hot: Vec<&str> = report.hot_items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(hot, vec!["pages:a", "api_keys:x", "pages:b", "loose"]);

        let cold: Vec<&str> = report.cold_items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(cold, vec!["pages:b", "loose", "api_keys:x", "pages:a"]);
    }

    #[test]
    fn test_top_lists_capped_at_ten() {
        let mut cache: CacheManager<Value> = CacheManager::with_capacity(100);
        for i in 0..25 {
            cache.set(format!("stats:{}", i), json!(i), None, None).unwrap();
        }

        let report = cache.detailed_report();
        assert_eq!(report.hot_items.len(), 10);
        assert_eq!(report.cold_items.len(), 10);
        assert_eq!(report.categories["stats"].count, 25);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(populated().detailed_report()).unwrap();
        assert!(json["stats"]["hit_rate"].is_number());
        assert!(json["categories"]["pages"].is_object());
        assert!(json["generated_at"].is_string());
    }
}
