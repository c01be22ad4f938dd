//! API Module
//!
//! Thin admin HTTP surface over the cache and memory subsystems.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `PUT /cache/set`, `GET /cache/get/:key`, `DELETE /cache/del/:key`, `DELETE /cache`
//! - `GET /cache/stats`, `GET /cache/report`
//! - `GET /memory/usage`, `GET /memory/stats`, `GET /memory/report`, `GET /memory/leaks`
//! - `POST /memory/gc`
//! - `GET /report` - Combined report

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
