//! Domain port surface for recording cache-aside outcomes.
//!
//! Cache failures never reach callers, so this port (together with logs) is
//! the only place they become visible. Implementations may export to
//! Prometheus or discard events in tests.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording cache metrics.
    pub enum CacheMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "cache metrics exporter failed: {message}",
    }
}

/// Outcome of one step of the cache-aside flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    /// Served from the cache.
    Hit,
    /// Nothing stored under the key.
    Miss,
    /// A payload was found but is structurally empty.
    EmptyPayload,
    /// Reading the cache failed or timed out.
    ReadError,
    /// Caller or configuration skipped the cache.
    Bypass,
    /// Backfill write completed.
    BackfillStored,
    /// Backfill write failed or timed out.
    BackfillFailed,
}

impl CacheEvent {
    /// Stable label used by exporters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::EmptyPayload => "empty_payload",
            Self::ReadError => "read_error",
            Self::Bypass => "bypass",
            Self::BackfillStored => "backfill_stored",
            Self::BackfillFailed => "backfill_failed",
        }
    }
}

/// Metrics recording port for cache-aside outcomes.
///
/// The orchestrator calls `record` from detached tasks, so events for one
/// read may arrive after the read has returned and in no guaranteed order
/// relative to other reads.
#[async_trait]
pub trait CacheMetrics: Send + Sync {
    /// Record `event` for the query operation (e.g. `ListProducts`).
    async fn record(&self, event: CacheEvent, operation: &str) -> Result<(), CacheMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCacheMetrics;

#[async_trait]
impl CacheMetrics for NoOpCacheMetrics {
    async fn record(&self, _event: CacheEvent, _operation: &str) -> Result<(), CacheMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CacheEvent::Hit, "hit")]
    #[case(CacheEvent::EmptyPayload, "empty_payload")]
    #[case(CacheEvent::BackfillFailed, "backfill_failed")]
    fn events_have_stable_labels(#[case] event: CacheEvent, #[case] label: &str) {
        assert_eq!(event.as_str(), label);
    }

    #[tokio::test]
    async fn no_op_metrics_accepts_every_event() {
        NoOpCacheMetrics
            .record(CacheEvent::Miss, "ListProducts")
            .await
            .expect("no-op recording succeeds");
    }
}
