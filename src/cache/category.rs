//! Cache categories and their TTL presets.
//!
//! Categories are key-prefix conventions (`"pages:abc"`), not separate stores.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Logical namespace for cached data, each with an immutable TTL preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Rendered shared pages
    Pages,
    /// API key lookups
    ApiKeys,
    /// Aggregate statistics
    Stats,
    /// Performance snapshots
    Performance,
    /// Memory snapshots
    Memory,
    /// Short-lived scratch values
    Quick,
}

impl CacheCategory {
    /// Preset lifetime for items of this category.
    pub const fn ttl(self) -> Duration {
        match self {
            CacheCategory::Pages => Duration::from_secs(10 * 60),
            CacheCategory::ApiKeys => Duration::from_secs(5 * 60),
            CacheCategory::Stats => Duration::from_secs(60),
            CacheCategory::Performance => Duration::from_secs(2 * 60),
            CacheCategory::Memory => Duration::from_secs(30),
            CacheCategory::Quick => Duration::from_secs(10),
        }
    }

    /// Key prefix used for scoped keys.
    pub const fn prefix(self) -> &'static str {
        match self {
            CacheCategory::Pages => "pages",
            CacheCategory::ApiKeys => "api_keys",
            CacheCategory::Stats => "stats",
            CacheCategory::Performance => "performance",
            CacheCategory::Memory => "memory",
            CacheCategory::Quick => "quick",
        }
    }

    /// Builds the full cache key for an id inside this category.
    pub fn scoped_key(self, id: &str) -> String {
        format!("{}:{}", self, id)
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Report grouping for a key: the text before the first `:`, else `"other"`.
pub fn group_of(key: &str) -> &str {
    match key.split_once(':') {
        Some((prefix, _)) => prefix,
        None => "other",
    }
}
