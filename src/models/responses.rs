//! Response DTOs for the gateway's JSON endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /_cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Entries dropped on lookup because their TTL elapsed
    pub expirations: u64,
    /// Entries evicted to stay within the byte budget
    pub evictions: u64,
    /// Fetched files too large to cache
    pub rejections: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Bytes currently cached
    pub total_bytes: u64,
    /// Configured byte budget
    pub max_bytes: u64,
    /// Remote fetches currently in progress
    pub fetches_in_flight: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, fetches_in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
            rejections: stats.rejections,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            max_bytes: stats.max_bytes,
            fetches_in_flight,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /_cache/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
