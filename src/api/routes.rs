//! API Routes
//!
//! Configures the Axum router with the admin endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_report_handler, cache_stats_handler, clear_handler, delete_handler, get_handler,
    health_handler, memory_gc_handler, memory_leaks_handler, memory_report_handler,
    memory_stats_handler, memory_usage_handler, set_handler, system_report_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `PUT /cache/set` - Store a value
/// - `GET /cache/get/:key` - Retrieve a value
/// - `DELETE /cache/del/:key` - Delete a key
/// - `DELETE /cache` - Clear the cache
/// - `GET /cache/stats`, `GET /cache/report` - Cache aggregates
/// - `GET /memory/usage`, `GET /memory/stats`, `GET /memory/report` - Memory figures
/// - `GET /memory/leaks` - Leak check over the sample history
/// - `POST /memory/gc` - Manual reclaim pass
/// - `GET /report` - Combined cache and memory report
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cache_routes = Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/stats", get(cache_stats_handler))
        .route("/report", get(cache_report_handler));

    let memory_routes = Router::new()
        .route("/usage", get(memory_usage_handler))
        .route("/stats", get(memory_stats_handler))
        .route("/report", get(memory_report_handler))
        .route("/leaks", get(memory_leaks_handler))
        .route("/gc", post(memory_gc_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/report", get(system_report_handler))
        .route("/cache", delete(clear_handler))
        .nest("/cache", cache_routes)
        .nest("/memory", memory_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
