//! Read-through cache-aside data access for product queries.
//!
//! The domain layer owns key derivation, deadlines and the cache-aside
//! state machine; outbound adapters provide the Redis store and metrics
//! exporters; `config` loads layered settings.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
