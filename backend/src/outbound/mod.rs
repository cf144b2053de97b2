//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: Redis-backed [`CacheStore`](crate::domain::ports::CacheStore)
//! - **metrics**: Prometheus-backed cache event counters (feature-gated)
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
#[cfg(feature = "metrics")]
pub mod metrics;
