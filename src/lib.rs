//! FTP Gateway - HTTP access to an FTP server through an in-memory cache
//!
//! Files are fetched once over a single FTP session and kept in a byte-budgeted
//! cache with lazy TTL expiration and oldest-insertion-first eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod remote;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use gateway::Gateway;
pub use tasks::spawn_sweep_task;
