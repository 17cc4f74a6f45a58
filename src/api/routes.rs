//! API Routes
//!
//! Configures the Axum router: `/_cache/*` endpoints plus a fallback that
//! serves every other path from the remote file server.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{file_handler, health_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /_cache/health` - Health check endpoint
/// - `GET /_cache/stats` - Cache statistics
/// - anything else - File from the remote base directory
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/_cache/health", get(health_handler))
        .route("/_cache/stats", get(stats_handler))
        .fallback(file_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
