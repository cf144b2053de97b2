//! Shared test doubles for cache-aside tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration and behaviour suites under `tests/`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::ports::{
    CacheEvent, CacheKey, CacheMetrics, CacheMetricsError, CacheStore, CacheStoreError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<String, Vec<u8>>,
    gets: Vec<String>,
    sets: Vec<String>,
    read_failure: Option<CacheStoreError>,
    write_failure: Option<CacheStoreError>,
    read_delay: Option<Duration>,
    write_delay: Option<Duration>,
}

/// In-memory [`CacheStore`] that records every call.
///
/// Reads and writes can be made to fail or stall to exercise the degraded
/// paths of the cache-aside flow.
#[derive(Default)]
pub struct InMemoryCacheStore {
    state: Mutex<StoreState>,
    stored: Notify,
}

impl InMemoryCacheStore {
    /// Seed `key` with `value` encoded as JSON.
    pub fn prime<T: serde::Serialize>(&self, key: &str, value: &T) {
        let bytes = serde_json::to_vec(value)
            .unwrap_or_else(|err| panic!("failed to encode primed value: {err}"));
        self.prime_raw(key, bytes);
    }

    /// Seed `key` with raw bytes.
    pub fn prime_raw(&self, key: &str, bytes: Vec<u8>) {
        lock(&self.state).entries.insert(key.to_owned(), bytes);
    }

    /// Make every read fail with `error`.
    pub fn fail_reads(&self, error: CacheStoreError) {
        lock(&self.state).read_failure = Some(error);
    }

    /// Make every write fail with `error`.
    pub fn fail_writes(&self, error: CacheStoreError) {
        lock(&self.state).write_failure = Some(error);
    }

    /// Stall reads for `delay` before answering.
    pub fn delay_reads(&self, delay: Duration) {
        lock(&self.state).read_delay = Some(delay);
    }

    /// Stall writes for `delay` before storing.
    pub fn delay_writes(&self, delay: Duration) {
        lock(&self.state).write_delay = Some(delay);
    }

    /// Keys passed to `get`, in call order.
    pub fn gets(&self) -> Vec<String> {
        lock(&self.state).gets.clone()
    }

    /// Keys passed to `set`, in call order.
    pub fn sets(&self) -> Vec<String> {
        lock(&self.state).sets.clone()
    }

    /// Decoded value currently stored under `key`.
    pub fn stored<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        lock(&self.state)
            .entries
            .get(key)
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    /// Wait until at least `count` writes have been attempted.
    ///
    /// Returns false if `timeout` elapses first.
    pub async fn wait_for_sets(&self, count: usize, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.stored.notified();
                if lock(&self.state).sets.len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let delay = {
            let mut state = lock(&self.state);
            state.gets.push(key.as_str().to_owned());
            state.read_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = lock(&self.state);
        match &state.read_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.entries.get(key.as_str()).cloned()),
        }
    }

    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> Result<(), CacheStoreError> {
        let delay = lock(&self.state).write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = {
            let mut state = lock(&self.state);
            state.sets.push(key.as_str().to_owned());
            match &state.write_failure {
                Some(err) => Err(err.clone()),
                None => {
                    state.entries.insert(key.as_str().to_owned(), value);
                    Ok(())
                }
            }
        };
        self.stored.notify_waiters();
        result
    }
}

/// [`CacheMetrics`] double that keeps every recorded event.
#[derive(Default)]
pub struct RecordingCacheMetrics {
    events: Mutex<Vec<(CacheEvent, String)>>,
}

impl RecordingCacheMetrics {
    /// Recorded `(event, operation)` pairs in call order.
    pub fn events(&self) -> Vec<(CacheEvent, String)> {
        lock(&self.events).clone()
    }

    /// Number of times `event` was recorded.
    pub fn count(&self, event: CacheEvent) -> usize {
        lock(&self.events)
            .iter()
            .filter(|(recorded, _)| *recorded == event)
            .count()
    }
}

#[async_trait]
impl CacheMetrics for RecordingCacheMetrics {
    async fn record(&self, event: CacheEvent, operation: &str) -> Result<(), CacheMetricsError> {
        lock(&self.events).push((event, operation.to_owned()));
        Ok(())
    }
}

/// [`CacheMetrics`] double whose exporter always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCacheMetrics;

#[async_trait]
impl CacheMetrics for FailingCacheMetrics {
    async fn record(&self, _event: CacheEvent, _operation: &str) -> Result<(), CacheMetricsError> {
        Err(CacheMetricsError::export("exporter offline"))
    }
}
