//! Cache Module
//!
//! Byte-budgeted in-memory file cache with lazy TTL expiration and
//! oldest-insertion-first eviction.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{CacheConfig, CacheStore, PutOutcome};
