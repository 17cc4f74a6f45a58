//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /_cache/health` - Health check endpoint
//! - `GET /_cache/stats` - Cache statistics
//! - any other path - File served through the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
