//! Read-through cache-aside orchestration.
//!
//! Each query walks the same states: check for bypass, read the cache under
//! a short deadline, serve a hit or fall through to the authoritative
//! source, respond, then backfill the cache from a detached task. Cache
//! failures are logged and counted but never reach the caller; source
//! failures are returned unchanged.

mod backfill;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::ports::{CacheEvent, CacheKey, CacheMetrics, CacheStore, NoOpCacheMetrics};
use super::{
    CacheClient, CachePayload, Deadline, EmptyPayloadPolicy, KeyDerivationError,
    QueryDescriptor, derive_key,
};

/// Default budget for cache reads and backfill writes.
pub const DEFAULT_CACHE_BUDGET: Duration = Duration::from_secs(3);

/// Tunables for the cache-aside flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Deadline applied to each cache read.
    pub read_budget: Duration,
    /// Deadline applied to each backfill write, measured from task start.
    pub write_budget: Duration,
    /// When false every query goes straight to the source and nothing is
    /// written back.
    pub enabled: bool,
    /// Handling of structurally empty cached payloads.
    pub empty_payload: EmptyPayloadPolicy,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            read_budget: DEFAULT_CACHE_BUDGET,
            write_budget: DEFAULT_CACHE_BUDGET,
            enabled: true,
            empty_payload: EmptyPayloadPolicy::default(),
        }
    }
}

/// Per-query caller options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Skip the cache read and serve from the source.
    pub bypass: bool,
}

impl ReadOptions {
    /// Options for a `no_cache` request.
    ///
    /// The cache is not read, but the fresh result is still written back so
    /// subsequent readers see it.
    pub const fn no_cache() -> Self {
        Self { bypass: true }
    }
}

/// Query result plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome<T> {
    /// The payload returned to the caller.
    pub value: T,
    /// True when the payload came from the cache.
    pub served_from_cache: bool,
}

impl<T> ReadOutcome<T> {
    fn from_cache(value: T) -> Self {
        Self {
            value,
            served_from_cache: true,
        }
    }

    fn from_source(value: T) -> Self {
        Self {
            value,
            served_from_cache: false,
        }
    }
}

/// Caller-visible failures of a cache-aside read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheAsideError<E> {
    /// No cache key could be derived; nothing was read or fetched.
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),
    /// The authoritative source failed.
    #[error(transparent)]
    Source(E),
}

/// Cache-aside orchestrator shared by all read paths.
pub struct CacheAside<S> {
    client: CacheClient<S>,
    policy: CachePolicy,
    metrics: Arc<dyn CacheMetrics>,
}

impl<S> Clone for CacheAside<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            policy: self.policy,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S> CacheAside<S> {
    /// Orchestrator that discards metrics.
    pub fn new(client: CacheClient<S>, policy: CachePolicy) -> Self {
        Self::with_metrics(client, policy, Arc::new(NoOpCacheMetrics))
    }

    /// Orchestrator reporting outcomes to `metrics`.
    pub fn with_metrics(
        client: CacheClient<S>,
        policy: CachePolicy,
        metrics: Arc<dyn CacheMetrics>,
    ) -> Self {
        Self {
            client,
            policy,
            metrics,
        }
    }
}

/// Result of the cache read step.
enum Lookup<T> {
    Hit(T),
    Fallthrough,
}

impl<S> CacheAside<S>
where
    S: CacheStore + 'static,
{
    /// Serve `descriptor` from the cache or, failing that, from `fetch`.
    ///
    /// `operation` names the query (e.g. `ListProducts`) and prefixes the
    /// derived key. `fetch` is only invoked when the cache cannot answer.
    ///
    /// # Errors
    ///
    /// Returns [`CacheAsideError::KeyDerivation`] before touching the cache
    /// or source when no key can be derived, and [`CacheAsideError::Source`]
    /// when `fetch` fails. Cache failures are never returned.
    pub async fn read<T, E, F, Fut>(
        &self,
        operation: &str,
        descriptor: &QueryDescriptor,
        options: ReadOptions,
        fetch: F,
    ) -> Result<ReadOutcome<T>, CacheAsideError<E>>
    where
        T: CachePayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = derive_key(operation, descriptor)?;

        if !self.policy.enabled || options.bypass {
            debug!(key = %key, enabled = self.policy.enabled, "cache bypassed");
            self.record(CacheEvent::Bypass, operation);
        } else if let Lookup::Hit(value) = self.lookup::<T>(&key, operation).await {
            return Ok(ReadOutcome::from_cache(value));
        }

        let value = fetch().await.map_err(CacheAsideError::Source)?;
        if self.policy.enabled {
            backfill::spawn(
                self.client.clone(),
                Arc::clone(&self.metrics),
                self.policy.write_budget,
                key,
                operation.to_owned(),
                value.clone(),
            );
        }
        Ok(ReadOutcome::from_source(value))
    }

    async fn lookup<T>(&self, key: &CacheKey, operation: &str) -> Lookup<T>
    where
        T: CachePayload,
    {
        let deadline = Deadline::after(self.policy.read_budget);
        match self.client.get::<T>(deadline, key).await {
            Ok(Some(value)) if !value.is_empty() => {
                debug!(key = %key, "cache hit");
                self.record(CacheEvent::Hit, operation);
                Lookup::Hit(value)
            }
            Ok(Some(value)) => {
                self.record(CacheEvent::EmptyPayload, operation);
                match self.policy.empty_payload {
                    EmptyPayloadPolicy::ServeFromCache => {
                        debug!(key = %key, "serving empty payload from cache");
                        self.record(CacheEvent::Hit, operation);
                        Lookup::Hit(value)
                    }
                    EmptyPayloadPolicy::TreatAsMiss => {
                        debug!(key = %key, "empty cached payload treated as miss");
                        Lookup::Fallthrough
                    }
                }
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                self.record(CacheEvent::Miss, operation);
                Lookup::Fallthrough
            }
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed; falling back to source");
                self.record(CacheEvent::ReadError, operation);
                Lookup::Fallthrough
            }
        }
    }

    /// Report `event` from a detached task so the exporter never sits on
    /// the response path.
    fn record(&self, event: CacheEvent, operation: &str) {
        let metrics = Arc::clone(&self.metrics);
        let operation = operation.to_owned();
        tokio::spawn(async move {
            record_event(metrics.as_ref(), event, &operation).await;
        });
    }
}

async fn record_event(metrics: &dyn CacheMetrics, event: CacheEvent, operation: &str) {
    if let Err(err) = metrics.record(event, operation).await {
        debug!(event = event.as_str(), operation, error = %err, "failed to record cache metric");
    }
}
