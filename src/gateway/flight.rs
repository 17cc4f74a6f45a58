//! Single-Flight Dispatch
//!
//! Concurrent callers asking for the same key share one execution of the
//! work. The first caller (the leader) spawns the work on the runtime, so it
//! keeps running even if the leader's own request is dropped; everyone,
//! leader included, waits on a broadcast of the result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

// == Single Flight ==
/// Deduplicates concurrent work per key.
#[derive(Debug)]
pub struct SingleFlight<T> {
    inflight: Mutex<HashMap<String, broadcast::Sender<T>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `work` for `key` unless a run is already in flight, in which case
    /// the caller waits for that run's result instead.
    ///
    /// Returns `None` only if the shared run died without producing a value.
    pub async fn run<F, Fut>(self: &Arc<Self>, key: &str, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut rx = {
            let mut inflight = self.lock();
            match inflight.get(key).map(|tx| tx.subscribe()) {
                Some(rx) => {
                    debug!(key, "Joining in-flight fetch");
                    rx
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    inflight.insert(key.to_string(), tx);

                    let landing = Landing {
                        flights: Arc::clone(self),
                        key: key.to_string(),
                        landed: false,
                    };
                    let fut = work();
                    tokio::spawn(async move {
                        let value = fut.await;
                        landing.land(value);
                    });
                    rx
                }
            }
        };

        rx.recv().await.ok()
    }

    // == In Flight ==
    /// Number of keys with a run currently in progress.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Number of callers currently waiting on `key`.
    pub fn waiters(&self, key: &str) -> usize {
        self.lock()
            .get(key)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<T>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes a run's result and retires its key, even if the run panics.
struct Landing<T> {
    flights: Arc<SingleFlight<T>>,
    key: String,
    landed: bool,
}

impl<T: Clone> Landing<T> {
    fn land(mut self, value: T) {
        // Retire the key before sending so no caller subscribes too late
        let tx = self
            .flights
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
        self.landed = true;

        if let Some(tx) = tx {
            // No receivers left is fine: every waiter went away
            let _ = tx.send(value);
        }
    }
}

impl<T> Drop for Landing<T> {
    fn drop(&mut self) {
        if !self.landed {
            self.flights
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.key);
        }
    }
}
