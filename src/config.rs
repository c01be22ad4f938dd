//! Configuration Module
//!
//! Loads deploy-time settings for the cache and the memory monitor from
//! environment variables. Values are read once at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache settings
    pub cache: CacheConfig,
    /// Memory monitor settings
    pub monitor: MonitorConfig,
    /// HTTP server port
    pub server_port: u16,
}

/// Settings consumed by [`crate::cache::CacheManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL applied when neither an explicit TTL nor a category is given
    pub default_ttl: Duration,
    /// Capacity bound on the number of items
    pub max_items: usize,
    /// Interval between expiry sweeps
    pub cleanup_interval: Duration,
    /// Hit rate below which a warning is emitted
    pub low_hit_rate_threshold: f64,
    /// Estimated cache size (MB) above which a forced cleanup runs
    pub memory_threshold_mb: f64,
}

/// Settings consumed by [`crate::memory::MemoryMonitor`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Heap usage (MB) classified as warning
    pub warning_threshold_mb: f64,
    /// Heap usage (MB) classified as critical
    pub critical_threshold_mb: f64,
    /// Heap usage (MB) above which a reclaim pass is triggered
    pub gc_threshold_mb: f64,
    /// Interval between samples
    pub monitor_interval: Duration,
    /// Number of samples kept in history
    pub snapshot_retention: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `MAX_ITEMS` - Maximum cache items (default: 1000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `LOW_HIT_RATE_THRESHOLD` - Hit rate warning threshold (default: 0.3)
    /// - `MEMORY_THRESHOLD_MB` - Cache size forcing cleanup (default: 50)
    /// - `WARNING_THRESHOLD_MB` - Heap warning level (default: 100)
    /// - `CRITICAL_THRESHOLD_MB` - Heap critical level (default: 200)
    /// - `GC_THRESHOLD_MB` - Heap level triggering reclaim (default: 150)
    /// - `MONITOR_INTERVAL` - Sampling frequency in seconds (default: 30)
    /// - `SNAPSHOT_RETENTION` - Samples kept in history (default: 20)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                default_ttl: env_parse("DEFAULT_TTL_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.cache.default_ttl),
                max_items: env_parse_nonzero("MAX_ITEMS").unwrap_or(defaults.cache.max_items),
                cleanup_interval: env_parse("CLEANUP_INTERVAL")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.cleanup_interval),
                low_hit_rate_threshold: env_parse("LOW_HIT_RATE_THRESHOLD")
                    .unwrap_or(defaults.cache.low_hit_rate_threshold),
                memory_threshold_mb: env_parse("MEMORY_THRESHOLD_MB")
                    .unwrap_or(defaults.cache.memory_threshold_mb),
            },
            monitor: MonitorConfig {
                warning_threshold_mb: env_parse("WARNING_THRESHOLD_MB")
                    .unwrap_or(defaults.monitor.warning_threshold_mb),
                critical_threshold_mb: env_parse("CRITICAL_THRESHOLD_MB")
                    .unwrap_or(defaults.monitor.critical_threshold_mb),
                gc_threshold_mb: env_parse("GC_THRESHOLD_MB")
                    .unwrap_or(defaults.monitor.gc_threshold_mb),
                monitor_interval: env_parse("MONITOR_INTERVAL")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.monitor.monitor_interval),
                snapshot_retention: env_parse_nonzero("SNAPSHOT_RETENTION")
                    .unwrap_or(defaults.monitor.snapshot_retention),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Counts and capacities: zero falls back to the default.
fn env_parse_nonzero(name: &str) -> Option<usize> {
    env_parse::<usize>(name).filter(|n| *n > 0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            monitor: MonitorConfig::default(),
            server_port: 3000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(300_000),
            max_items: 1000,
            cleanup_interval: Duration::from_secs(60),
            low_hit_rate_threshold: 0.3,
            memory_threshold_mb: 50.0,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            warning_threshold_mb: 100.0,
            critical_threshold_mb: 200.0,
            gc_threshold_mb: 150.0,
            monitor_interval: Duration::from_secs(30),
            snapshot_retention: 20,
        }
    }
}
