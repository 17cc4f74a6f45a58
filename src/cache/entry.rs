//! Cache Entry Module
//!
//! Defines a single cached file body and its insertion metadata.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A cached file body keyed by its logical path.
///
/// Entries are immutable once created; a refetch replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached file body
    pub content: Bytes,
    /// When the entry was inserted (never updated on read)
    pub inserted_at: DateTime<Utc>,
    /// Store-wide insertion sequence number, breaks `inserted_at` ties
    pub seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with `inserted_at`.
    pub fn new(content: Bytes, inserted_at: DateTime<Utc>, seq: u64) -> Self {
        Self {
            content,
            inserted_at,
            seq,
        }
    }

    // == Size ==
    /// Number of bytes this entry contributes to the store budget.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl` as of `now`.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is
    /// already expired, so a zero TTL expires every entry on its next lookup.
    /// A clock reading earlier than `inserted_at` counts as age zero.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now
            .signed_duration_since(self.inserted_at)
            .to_std()
            .unwrap_or_default();
        age >= ttl
    }

    // == Eviction Order ==
    /// Sort key for eviction: oldest insertion first.
    pub fn eviction_rank(&self) -> (DateTime<Utc>, u64) {
        (self.inserted_at, self.seq)
    }
}
