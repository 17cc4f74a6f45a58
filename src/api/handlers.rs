//! API Handlers
//!
//! HTTP request handlers for file requests and the `/_cache/*` endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{logical_path, Gateway};
use crate::models::{HealthResponse, StatsResponse};
use crate::remote::RemoteStore;

/// Response header reporting whether the body came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-fronted remote access
    pub gateway: Gateway,
}

impl AppState {
    /// Creates a new AppState around an existing gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a new AppState from configuration and a connected remote.
    pub fn from_config(config: &Config, remote: Arc<dyn RemoteStore>) -> Self {
        let cache = CacheStore::new(config.cache_config());
        Self::new(Gateway::new(cache, remote, &config.ftp_base_dir))
    }
}

/// Fallback handler: every path outside `/_cache/` is a file request.
///
/// Responds 200 with the body and a sniffed Content-Type, 404 when the remote
/// has no such file, 500 when the transfer fails.
pub async fn file_handler(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let path = logical_path(uri.path())?;
    let served = state.gateway.serve(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(served.content_type)),
            (X_CACHE, HeaderValue::from_static(served.cache_status.as_str())),
        ],
        served.content,
    )
        .into_response())
}

/// Handler for GET /_cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.gateway.stats().await;
    Json(StatsResponse::new(&stats, state.gateway.fetches_in_flight()))
}

/// Handler for GET /_cache/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
