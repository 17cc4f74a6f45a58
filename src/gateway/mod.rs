//! Gateway Module
//!
//! Orchestrates a file request: cache lookup, remote fetch on miss, cache
//! population on success.
//!
//! Concurrent misses for one path are collapsed into a single remote fetch.
//! The cache lock is never held while talking to the remote server.

mod flight;
mod path;
mod sniff;

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, PutOutcome};
use crate::error::{GatewayError, Result};
use crate::remote::{FetchError, RemoteStore};

pub use flight::SingleFlight;
pub use path::{logical_path, remote_path};
pub use sniff::detect_content_type;

type FetchResult = std::result::Result<Bytes, FetchError>;

// == Cache Status ==
/// Whether a response came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

// == Served File ==
/// A file body ready to be written to the client.
#[derive(Debug, Clone)]
pub struct ServedFile {
    pub content: Bytes,
    pub content_type: &'static str,
    pub cache_status: CacheStatus,
}

impl ServedFile {
    fn new(content: Bytes, cache_status: CacheStatus) -> Self {
        Self {
            content_type: detect_content_type(&content),
            content,
            cache_status,
        }
    }
}

// == Gateway ==
/// Cache-fronted access to the remote file server.
///
/// Cheap to clone; clones share the same cache, remote session and in-flight table.
#[derive(Clone)]
pub struct Gateway {
    cache: Arc<Mutex<CacheStore>>,
    remote: Arc<dyn RemoteStore>,
    base_dir: Arc<str>,
    flights: Arc<SingleFlight<FetchResult>>,
}

impl Gateway {
    // == Constructor ==
    /// Creates a gateway owning `cache` and fetching misses from `remote`
    /// under `base_dir`.
    pub fn new(cache: CacheStore, remote: Arc<dyn RemoteStore>, base_dir: &str) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            remote,
            base_dir: Arc::from(base_dir),
            flights: Arc::new(SingleFlight::new()),
        }
    }

    // == Serve ==
    /// Returns the body for `logical`, from the cache when possible.
    pub async fn serve(&self, logical: &str) -> Result<ServedFile> {
        let cached = self.cache.lock().await.lookup(logical);
        if let Some(content) = cached {
            debug!(path = %logical, bytes = content.len(), "Serving from cache");
            return Ok(ServedFile::new(content, CacheStatus::Hit));
        }

        let content = self.fetch_and_cache(logical).await?;
        Ok(ServedFile::new(content, CacheStatus::Miss))
    }

    /// Fetches `logical` from the remote server, sharing the fetch with any
    /// concurrent request for the same path, and caches a successful result.
    async fn fetch_and_cache(&self, logical: &str) -> Result<Bytes> {
        let key = logical.to_string();
        let remote_path = remote_path(&self.base_dir, logical);
        let remote = Arc::clone(&self.remote);
        let cache = Arc::clone(&self.cache);

        let outcome = self
            .flights
            .run(logical, move || async move {
                info!(path = %remote_path, "Fetching file from remote server");
                let result = remote.fetch(&remote_path).await;

                match &result {
                    Ok(content) => {
                        let size = content.len();
                        match cache.lock().await.put(key, content.clone()) {
                            PutOutcome::Stored { evicted } => {
                                debug!(path = %remote_path, size, evicted, "Cached remote file")
                            }
                            PutOutcome::Rejected => {
                                warn!(path = %remote_path, size, "File exceeds cache budget, not cached")
                            }
                        }
                    }
                    Err(e) => warn!(path = %remote_path, error = %e, "Remote fetch failed"),
                }
                result
            })
            .await;

        match outcome {
            Some(result) => result.map_err(GatewayError::from),
            None => Err(GatewayError::Transfer(format!(
                "fetch for {} was abandoned",
                logical
            ))),
        }
    }

    // == Stats ==
    /// Returns a snapshot of cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Number of remote fetches currently in progress.
    pub fn fetches_in_flight(&self) -> usize {
        self.flights.in_flight()
    }

    /// Requests currently waiting on the in-flight fetch for `logical`.
    pub fn fetch_waiters(&self, logical: &str) -> usize {
        self.flights.waiters(logical)
    }

    /// Shared handle to the cache, for background maintenance.
    pub fn cache(&self) -> Arc<Mutex<CacheStore>> {
        Arc::clone(&self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, ManualClock};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// In-memory remote that counts calls.
    #[derive(Default)]
    struct FakeRemote {
        files: HashMap<String, FetchResult>,
        calls: AtomicUsize,
    }

    impl FakeRemote {
        fn with(mut self, path: &str, result: FetchResult) -> Self {
            self.files.insert(path.to_string(), result);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        async fn fetch(&self, path: &str) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::NotFound(path.to_string())))
        }
    }

    fn gateway(remote: Arc<FakeRemote>, max_bytes: u64) -> (Gateway, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = CacheStore::with_clock(
            CacheConfig {
                max_bytes,
                ttl: Duration::from_secs(30 * 60),
            },
            clock.clone(),
        );
        (Gateway::new(store, remote, "/public"), clock)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let remote = Arc::new(
            FakeRemote::default().with("/public/a.html", Ok(Bytes::from_static(b"<html></html>"))),
        );
        let (gateway, _) = gateway(remote.clone(), 1024);

        let first = assert_ok!(gateway.serve("/a.html").await);
        let second = assert_ok!(gateway.serve("/a.html").await);

        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.content, Bytes::from_static(b"<html></html>"));
        assert_eq!(second.content_type, "text/html; charset=utf-8");
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let remote =
            Arc::new(FakeRemote::default().with("/public/a.txt", Ok(Bytes::from_static(b"a"))));
        let (gateway, clock) = gateway(remote.clone(), 1024);

        assert_ok!(gateway.serve("/a.txt").await);
        clock.advance(Duration::from_secs(31 * 60));
        let again = assert_ok!(gateway.serve("/a.txt").await);

        assert_eq!(again.cache_status, CacheStatus::Miss);
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let remote = Arc::new(FakeRemote::default());
        let (gateway, _) = gateway(remote.clone(), 1024);

        let err = assert_err!(gateway.serve("/missing.txt").await);

        assert!(matches!(err, GatewayError::NotFound(_)));
        assert!(!gateway.cache().lock().await.contains("/missing.txt"));
        assert_eq!(gateway.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_transient_error_is_not_cached() {
        let remote = Arc::new(FakeRemote::default().with(
            "/public/flaky.bin",
            Err(FetchError::Transient("connection reset".to_string())),
        ));
        let (gateway, _) = gateway(remote.clone(), 1024);

        let err = assert_err!(gateway.serve("/flaky.bin").await);

        assert!(matches!(err, GatewayError::Transfer(_)));
        assert!(!gateway.cache().lock().await.contains("/flaky.bin"));

        // Not retried internally, and the next request asks again
        assert_eq!(remote.calls(), 1);
        let _ = gateway.serve("/flaky.bin").await;
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_oversized_file_is_served_but_not_cached() {
        let body = Bytes::from(vec![b'x'; 200]);
        let remote = Arc::new(FakeRemote::default().with("/public/big.txt", Ok(body.clone())));
        let (gateway, _) = gateway(remote.clone(), 100);

        let served = assert_ok!(gateway.serve("/big.txt").await);

        assert_eq!(served.content, body);
        assert_eq!(gateway.stats().await.rejections, 1);
        assert_eq!(gateway.stats().await.total_bytes, 0);
    }

    #[tokio::test]
    async fn test_cache_key_is_logical_path() {
        let remote =
            Arc::new(FakeRemote::default().with("/public/dir/f.txt", Ok(Bytes::from_static(b"f"))));
        let (gateway, _) = gateway(remote, 1024);

        assert_ok!(gateway.serve("/dir/f.txt").await);

        let cache = gateway.cache();
        let cache = cache.lock().await;
        assert!(cache.contains("/dir/f.txt"));
        assert!(!cache.contains("/public/dir/f.txt"));
    }
}
