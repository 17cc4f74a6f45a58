//! Cache Store Module
//!
//! Byte-budgeted map from logical path to file body with lazy TTL expiration
//! and oldest-insertion-first eviction.
//!
//! Eviction order follows *insertion* time, not access time: reading an entry
//! never extends its life, while replacing it with a fresh fetch does. Expired
//! entries are only removed when looked up (or evicted for space), so they may
//! stay resident and counted in [`CacheStore::total_bytes`] until then.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Cache Config ==
/// Limits fixed at store construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Eviction threshold in bytes
    pub max_bytes: u64,
    /// Expiration horizon
    pub ttl: Duration,
}

// == Put Outcome ==
/// What a [`CacheStore::put`] did with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Entry stored; `evicted` older entries were dropped to make room.
    Stored { evicted: usize },
    /// Content alone exceeds `max_bytes`; the store was left untouched.
    Rejected,
}

// == Cache Store ==
/// Size- and time-bounded cache of file bodies.
///
/// Not synchronized itself; the gateway owns it behind a single exclusive lock.
#[derive(Debug)]
pub struct CacheStore {
    /// Path -> entry
    entries: HashMap<String, CacheEntry>,
    /// Sum of `content.len()` over `entries`
    total_bytes: u64,
    /// Next insertion sequence number
    next_seq: u64,
    /// Performance statistics
    stats: CacheStats,
    max_bytes: u64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store reading the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            total_bytes: 0,
            next_seq: 0,
            stats: CacheStats::new(config.max_bytes),
            max_bytes: config.max_bytes,
            ttl: config.ttl,
            clock,
        }
    }

    // == Lookup ==
    /// Returns the cached body for `key` if present and not expired.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn lookup(&mut self, key: &str) -> Option<Bytes> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => {
                let content = entry.content.clone();
                self.stats.record_hit();
                return Some(content);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expiration();
            debug!(key, "Cache entry expired");
        }
        self.stats.record_miss();
        None
    }

    // == Put ==
    /// Stores `content` under `key`, replacing any previous entry, then evicts
    /// the oldest entries until the byte budget is met.
    ///
    /// Content larger than the whole budget is rejected without touching the store.
    pub fn put(&mut self, key: String, content: Bytes) -> PutOutcome {
        let size = content.len() as u64;
        if size > self.max_bytes {
            self.stats.record_rejection();
            debug!(key = %key, size, max_bytes = self.max_bytes, "Rejected oversized entry");
            return PutOutcome::Rejected;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let entry = CacheEntry::new(content, self.clock.now(), seq);
        if let Some(previous) = self.entries.insert(key, entry) {
            self.total_bytes -= previous.size();
        }
        self.total_bytes += size;

        let mut evicted = 0;
        while self.total_bytes > self.max_bytes {
            let Some(oldest) = self.oldest_key() else {
                break;
            };
            self.remove_entry(&oldest);
            self.stats.record_eviction();
            evicted += 1;
            debug!(key = %oldest, "Evicted oldest cache entry");
        }

        self.sync_stats();
        PutOutcome::Stored { evicted }
    }

    // == Contains ==
    /// Checks for an entry without applying expiration or touching stats.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Purge Expired ==
    /// Removes every expired entry, returning how many were dropped.
    ///
    /// Only the optional background sweep calls this; lookups expire lazily.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
            self.stats.record_expiration();
        }
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn oldest_key(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.eviction_rank())
            .map(|(key, _)| key.clone())
    }

    fn remove_entry(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.total_bytes -= entry.size();
        }
        self.sync_stats();
    }

    fn sync_stats(&mut self) {
        self.stats.set_occupancy(self.entries.len(), self.total_bytes);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const MINUTE: Duration = Duration::from_secs(60);

    fn store_with(max_bytes: u64, ttl: Duration) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = CacheStore::with_clock(CacheConfig { max_bytes, ttl }, clock.clone());
        (store, clock)
    }

    fn bytes_of(len: usize) -> Bytes {
        Bytes::from(vec![b'a'; len])
    }

    #[test]
    fn test_store_new() {
        let (store, _) = store_with(100, 30 * MINUTE);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.max_bytes(), 100);
    }

    #[test]
    fn test_store_put_and_lookup() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        let outcome = store.put("/a.txt".to_string(), Bytes::from_static(b"hello"));
        assert_eq!(outcome, PutOutcome::Stored { evicted: 0 });

        assert_eq!(store.lookup("/a.txt"), Some(Bytes::from_static(b"hello")));
        assert_eq!(store.total_bytes(), 5);
    }

    #[test]
    fn test_store_lookup_nonexistent() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        assert!(store.lookup("/nope").is_none());
        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.stats().expirations, 0);
    }

    #[test]
    fn test_store_replace_is_not_additive() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("k".to_string(), bytes_of(40));
        store.put("k".to_string(), bytes_of(10));

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 10);
        assert_eq!(store.lookup("k"), Some(bytes_of(10)));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(8));
        assert!(store.lookup("a").is_some());

        clock.advance(31 * MINUTE);

        assert!(store.lookup("a").is_none());
        assert!(!store.contains("a"));
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_expired_entry_stays_resident_until_accessed() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(8));
        clock.advance(31 * MINUTE);

        assert!(store.contains("a"));
        assert_eq!(store.total_bytes(), 8);
    }

    #[test]
    fn test_store_read_does_not_extend_life() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(8));
        clock.advance(20 * MINUTE);
        assert!(store.lookup("a").is_some());
        clock.advance(10 * MINUTE);

        assert!(store.lookup("a").is_none());
    }

    #[test]
    fn test_store_replace_resets_age() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(8));
        clock.advance(20 * MINUTE);
        store.put("a".to_string(), bytes_of(8));
        clock.advance(20 * MINUTE);

        assert!(store.lookup("a").is_some());
    }

    #[test]
    fn test_store_zero_ttl_never_hits() {
        let (mut store, _) = store_with(100, Duration::ZERO);

        store.put("a".to_string(), bytes_of(8));

        assert!(store.lookup("a").is_none());
        assert_eq!(store.total_bytes(), 0);
    }

    #[test]
    fn test_store_evicts_oldest_insertion() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("x".to_string(), bytes_of(60));
        let outcome = store.put("y".to_string(), bytes_of(60));

        assert_eq!(outcome, PutOutcome::Stored { evicted: 1 });
        assert!(!store.contains("x"));
        assert!(store.contains("y"));
        assert_eq!(store.total_bytes(), 60);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_eviction_ignores_reads() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("old".to_string(), bytes_of(40));
        clock.advance(MINUTE);
        store.put("new".to_string(), bytes_of(40));
        clock.advance(MINUTE);

        // Reading "old" does not protect it
        assert!(store.lookup("old").is_some());
        store.put("third".to_string(), bytes_of(40));

        assert!(!store.contains("old"));
        assert!(store.contains("new"));
        assert!(store.contains("third"));
    }

    #[test]
    fn test_store_evicts_several_to_fit() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(30));
        store.put("b".to_string(), bytes_of(30));
        store.put("c".to_string(), bytes_of(30));
        let outcome = store.put("d".to_string(), bytes_of(90));

        assert_eq!(outcome, PutOutcome::Stored { evicted: 3 });
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 90);
    }

    #[test]
    fn test_store_exact_budget_fits() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("a".to_string(), bytes_of(50));
        let outcome = store.put("b".to_string(), bytes_of(50));

        assert_eq!(outcome, PutOutcome::Stored { evicted: 0 });
        assert_eq!(store.total_bytes(), 100);
    }

    #[test]
    fn test_store_rejects_oversized_content() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("small".to_string(), bytes_of(10));
        let outcome = store.put("huge".to_string(), bytes_of(101));

        assert_eq!(outcome, PutOutcome::Rejected);
        assert!(!store.contains("huge"));
        assert!(store.contains("small"));
        assert_eq!(store.total_bytes(), 10);
        assert_eq!(store.stats().rejections, 1);
    }

    #[test]
    fn test_store_rejected_refresh_keeps_previous_entry() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("k".to_string(), bytes_of(10));
        store.put("k".to_string(), bytes_of(500));

        assert_eq!(store.lookup("k"), Some(bytes_of(10)));
    }

    #[test]
    fn test_store_purge_expired() {
        let (mut store, clock) = store_with(100, 30 * MINUTE);

        store.put("old".to_string(), bytes_of(10));
        clock.advance(20 * MINUTE);
        store.put("fresh".to_string(), bytes_of(20));
        clock.advance(15 * MINUTE);

        assert_eq!(store.purge_expired(), 1);
        assert!(!store.contains("old"));
        assert!(store.contains("fresh"));
        assert_eq!(store.total_bytes(), 20);
    }

    #[test]
    fn test_store_stats() {
        let (mut store, _) = store_with(100, 30 * MINUTE);

        store.put("k".to_string(), bytes_of(10));
        store.lookup("k");
        store.lookup("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 10);
    }
}
