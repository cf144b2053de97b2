//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`CacheStore`], [`ProductSource`], [`CacheMetrics`]) are
//! implemented by outbound adapters; the driving port ([`ProductQuery`]) is
//! what inbound adapters call. Each port exposes a typed error enum so
//! adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod cache_metrics;
mod cache_store;
mod product_query;
mod product_source;

pub use cache_key::{CacheKey, CacheKeyValidationError};
pub use cache_metrics::{CacheEvent, CacheMetrics, CacheMetricsError, NoOpCacheMetrics};
#[cfg(test)]
pub use cache_store::MockCacheStore;
pub use cache_store::{CacheStore, CacheStoreError, FixtureCacheStore};
#[cfg(test)]
pub use product_query::MockProductQuery;
pub use product_query::{ProductQuery, ProductReadError};
#[cfg(test)]
pub use product_source::MockProductSource;
pub use product_source::{FixtureProductSource, ProductSource, ProductSourceError};
