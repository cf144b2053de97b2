//! Detached cache backfill after an authoritative fetch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::record_event;
use crate::domain::ports::{CacheEvent, CacheKey, CacheMetrics, CacheStore};
use crate::domain::{CacheClient, CachePayload, Deadline};

/// Write `value` under `key` from an independent task.
///
/// The write deadline starts when the task runs, so it is unaffected by the
/// request that triggered it finishing or being dropped. Failures are logged
/// and counted only.
pub(super) fn spawn<S, T>(
    client: CacheClient<S>,
    metrics: Arc<dyn CacheMetrics>,
    budget: Duration,
    key: CacheKey,
    operation: String,
    value: T,
) where
    S: CacheStore + 'static,
    T: CachePayload,
{
    tokio::spawn(async move {
        let deadline = Deadline::after(budget);
        match client.set(deadline, &key, &value).await {
            Ok(()) => {
                debug!(key = %key, "cache backfilled");
                record_event(metrics.as_ref(), CacheEvent::BackfillStored, &operation).await;
            }
            Err(err) => {
                warn!(key = %key, error = %err, "cache backfill failed");
                record_event(metrics.as_ref(), CacheEvent::BackfillFailed, &operation).await;
            }
        }
    });
}
