//! Response models for the gateway's JSON endpoints
//!
//! File bodies are returned raw; only the `/_cache/*` endpoints speak JSON.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
