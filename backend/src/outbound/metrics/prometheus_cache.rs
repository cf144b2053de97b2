//! Prometheus adapter for cache-aside events.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{CacheEvent, CacheMetrics, CacheMetricsError};

/// Prometheus-backed cache event recorder.
///
/// - **Name**: `product_cache_events_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `event`: `hit`, `miss`, `empty_payload`, `read_error`, `bypass`,
///     `backfill_stored` or `backfill_failed`
///   - `operation`: query name, e.g. `ProductById` or `ListProducts`
pub struct PrometheusCacheMetrics {
    events_total: IntCounterVec,
}

impl PrometheusCacheMetrics {
    /// Create the counter and register it with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let events_total = IntCounterVec::new(
            Opts::new(
                "product_cache_events_total",
                "Cache-aside outcomes by event and operation",
            ),
            &["event", "operation"],
        )?;
        registry.register(Box::new(events_total.clone()))?;
        Ok(Self { events_total })
    }
}

#[async_trait]
impl CacheMetrics for PrometheusCacheMetrics {
    async fn record(&self, event: CacheEvent, operation: &str) -> Result<(), CacheMetricsError> {
        let counter = self
            .events_total
            .get_metric_with_label_values(&[event.as_str(), operation])
            .map_err(|err| CacheMetricsError::export(err.to_string()))?;
        counter.inc();
        Ok(())
    }
}
