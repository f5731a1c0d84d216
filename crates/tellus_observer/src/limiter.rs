//! Serialized, rate-limited task execution with in-flight deduplication.
//!
//! The limiter is a single-slot executor: tasks chain on an internal
//! mutex, each waiting out the minimum interval before running. The
//! deduplication map lets concurrent callers of the same key await one
//! shared computation instead of starting their own.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct AiRateLimiter {
    min_interval: Duration,
    /// Serializes execution; also guards `next_allowed_at`.
    slot: Mutex<Instant>,
}

impl AiRateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            slot: Mutex::new(Instant::now()),
        }
    }

    /// Runs `task` after waiting out the interval; callers queue on the
    /// internal slot in arrival order.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut next_allowed_at = self.slot.lock().await;
        let now = Instant::now();
        if *next_allowed_at > now {
            tokio::time::sleep_until(*next_allowed_at).await;
        }
        *next_allowed_at = Instant::now() + self.min_interval;
        task.await
    }
}

type PendingFuture = Shared<BoxFuture<'static, Value>>;

/// In-flight deduplication: callers of the same key join the live
/// computation rather than starting a second one.
#[derive(Default, Clone)]
pub struct InFlightMap {
    pending: Arc<std::sync::Mutex<HashMap<String, PendingFuture>>>,
}

impl InFlightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing pending future for `key`, or installs the one
    /// produced by `make` and returns it.
    pub fn join_or_start<F>(&self, key: &str, make: impl FnOnce() -> F) -> PendingFuture
    where
        F: Future<Output = Value> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = pending.get(key) {
            return existing.clone();
        }
        let fut = make().boxed().shared();
        pending.insert(key.to_string(), fut.clone());
        fut
    }

    /// Drops the finished computation for `key`.
    pub fn finish(&self, key: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(key);
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn limiter_spaces_out_tasks() {
        tokio::time::pause();
        let limiter = AiRateLimiter::new(100);
        let start = Instant::now();
        limiter.run(async {}).await;
        limiter.run(async {}).await;
        limiter.run(async {}).await;
        // Two full intervals must have elapsed before the third task ran.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn in_flight_callers_share_one_computation() {
        let map = InFlightMap::new();
        let calls = Arc::new(AtomicU32::new(0));

        let make = {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    json!("answer")
                }
            }
        };
        let a = map.join_or_start("q", make.clone());
        let b = map.join_or_start("q", make);
        let (ra, rb) = futures::join!(a, b);
        map.finish("q");

        assert_eq!(ra, rb);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(map.is_empty());
    }
}
