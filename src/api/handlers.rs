//! API Handlers
//!
//! HTTP request handlers for the admin endpoints. Each handler takes the
//! lock it needs, calls one subsystem operation and serializes the result.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::{CacheManager, CacheStatsSnapshot, DetailedCacheReport, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::memory::{
    DetailedMemoryStats, GcOutcome, LeakSignal, MemoryMonitor, MemoryReport, MemoryUsage,
    SharedMonitor,
};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
};
use crate::report::SystemReport;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub memory: SharedMonitor,
}

impl AppState {
    pub fn new(cache: CacheManager, memory: MemoryMonitor) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            memory: Arc::new(RwLock::new(memory)),
        }
    }

    /// Cache from `config.cache`, monitor backed by the live process.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CacheManager::new(config.cache.clone()),
            MemoryMonitor::system(config.monitor.clone()),
        )
    }
}

// == Cache Handlers ==
/// Handler for PUT /cache/set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, ttl, req.category)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a read updates recency and counters
    let mut cache = state.cache.write().await;
    match cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if cache.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.write().await.clear();
    Json(ClearResponse { cleared })
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsSnapshot> {
    Json(state.cache.read().await.stats())
}

/// Handler for GET /cache/report
pub async fn cache_report_handler(State(state): State<AppState>) -> Json<DetailedCacheReport> {
    Json(state.cache.read().await.detailed_report())
}

// == Memory Handlers ==
/// Handler for GET /memory/usage
pub async fn memory_usage_handler(State(state): State<AppState>) -> Json<MemoryUsage> {
    Json(state.memory.write().await.usage())
}

/// Handler for GET /memory/stats
pub async fn memory_stats_handler(State(state): State<AppState>) -> Json<DetailedMemoryStats> {
    Json(state.memory.write().await.detailed_stats())
}

/// Handler for GET /memory/report
pub async fn memory_report_handler(State(state): State<AppState>) -> Json<MemoryReport> {
    Json(state.memory.write().await.generate_report())
}

/// Handler for GET /memory/leaks
pub async fn memory_leaks_handler(State(state): State<AppState>) -> Json<LeakSignal> {
    Json(state.memory.read().await.detect_leaks())
}

/// Handler for POST /memory/gc
///
/// Always 200; an unavailable reclaimer is reported in the body.
pub async fn memory_gc_handler(State(state): State<AppState>) -> Json<GcOutcome> {
    Json(state.memory.write().await.force_gc())
}

// == Combined ==
/// Handler for GET /report
pub async fn system_report_handler(State(state): State<AppState>) -> Json<SystemReport> {
    let cache = state.cache.read().await;
    let mut memory = state.memory.write().await;
    Json(SystemReport::collect(&cache, &mut memory))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_items = state.cache.read().await.len();
    let monitoring = state.memory.read().await.is_monitoring();
    Json(HealthResponse::healthy(cache_items, monitoring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheCategory;
    use crate::config::{CacheConfig, MonitorConfig};
    use crate::memory::{NoopReclaimer, ScriptedProbe};
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(
            CacheManager::new(CacheConfig::default()),
            MemoryMonitor::new(
                MonitorConfig::default(),
                Box::new(ScriptedProbe::from_heap_mb(&[20.0, 25.0])),
                Box::new(NoopReclaimer),
            ),
        )
    }

    fn set_request(key: &str, value: serde_json::Value) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value,
            ttl_ms: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = set_request("pages:home", json!({"title": "Home"}));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state.clone()), Path("pages:home".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"title": "Home"}));
    }

    #[tokio::test]
    async fn test_set_with_category_uses_preset_ttl() {
        let state = test_state();

        let mut req = set_request("quick:ping", json!(1));
        req.category = Some(CacheCategory::Quick);
        let response = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(response.key, "quick:ping");

        let cache = state.cache.read().await;
        let report = cache.detailed_report();
        let ttl_remaining = report.hot_items[0].ttl_remaining_ms;
        assert!(ttl_remaining <= CacheCategory::Quick.ttl().as_millis() as u64);
        assert!(ttl_remaining > 9_000);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state.clone()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
        assert_eq!(state.cache.read().await.counters().misses, 1);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let _response = set_handler(State(state.clone()), Json(set_request("to_delete", json!("v"))))
            .await
            .unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = delete_handler(State(state), Path("to_delete".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();
        for key in ["a", "b", "c"] {
            let _response = set_handler(State(state.clone()), Json(set_request(key, json!(key))))
                .await
                .unwrap();
        }

        let response = clear_handler(State(state.clone())).await;
        assert_eq!(response.cleared, 3);
        assert!(state.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_stats_handler() {
        let state = test_state();

        let response = cache_stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.hit_rate, 0.0);
        assert_eq!(response.max_items, CacheConfig::default().max_items);
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let result = set_handler(State(state), Json(set_request("", json!("value")))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_memory_usage_handler_reads_probe() {
        let state = test_state();

        let response = memory_usage_handler(State(state)).await;
        assert_eq!(response.heap_used, 20.0);
    }

    #[tokio::test]
    async fn test_memory_gc_handler_reports_unavailable() {
        let state = test_state();

        let response = memory_gc_handler(State(state)).await;
        assert!(!response.success());
    }

    #[tokio::test]
    async fn test_memory_leaks_handler_without_history() {
        let state = test_state();

        let response = memory_leaks_handler(State(state)).await;
        assert!(matches!(response.0, LeakSignal::NotDetected { .. }));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = test_state();

        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cache_items, 0);
        assert!(!response.monitoring);
    }
}
