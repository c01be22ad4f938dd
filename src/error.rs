//! Error types for the cache and memory subsystems
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for cache operations and the admin API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (or already expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key rejected before insertion
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Malformed admin request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_) | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Memory Error Enum ==
/// Failures inside the memory subsystem.
///
/// These never escape as faults: probes fall back to zeroed readings and
/// reclaim failures become [`crate::memory::GcOutcome::Unavailable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// Process memory could not be read
    #[error("memory probe unavailable: {0}")]
    ProbeUnavailable(String),

    /// No manual reclaim capability on this platform
    #[error("manual memory reclaim not available: {0}")]
    ReclaimUnavailable(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
