//! Domain types and services for cached product reads.
//!
//! Public surface:
//! - `derive_key` / `QueryDescriptor`: deterministic cache keys per query.
//! - `CacheClient`: deadline-bounded, typed access to a `CacheStore`.
//! - `CacheAside`: the read-through orchestrator with detached backfill.
//! - `ProductReadService`: the `ProductQuery` implementation.

pub mod ports;

mod cache_aside;
mod cache_client;
mod deadline;
mod key_derivation;
mod payload;
mod product;
mod product_read_service;

pub use self::cache_aside::{
    CacheAside, CacheAsideError, CachePolicy, DEFAULT_CACHE_BUDGET, ReadOptions, ReadOutcome,
};
pub use self::cache_client::{CacheClient, CacheClientError};
pub use self::deadline::Deadline;
pub use self::key_derivation::{KeyDerivationError, QueryDescriptor, derive_key};
pub use self::payload::{CachePayload, EmptyPayloadPolicy};
pub use self::product::{Product, ProductId};
pub use self::product_read_service::{
    LIST_PRODUCTS_OPERATION, PRODUCT_BY_ID_OPERATION, ProductReadService,
};
