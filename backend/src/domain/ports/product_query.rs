//! Driving port for cached product reads.
//!
//! Inbound adapters (HTTP handlers, RPC services) call this port with the
//! parsed query and the caller's `no_cache` choice. The returned
//! [`ReadOutcome`] carries the payload and whether it was served from cache.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{CacheAsideError, Product, ProductId, ReadOptions, ReadOutcome};

use super::ProductSourceError;

/// Caller-visible product read failure.
pub type ProductReadError = CacheAsideError<ProductSourceError>;

/// Domain use-case port for product reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductQuery: Send + Sync {
    /// Fetch one product by identifier.
    async fn get_product(
        &self,
        id: ProductId,
        options: ReadOptions,
    ) -> Result<ReadOutcome<Product>, ProductReadError>;

    /// Fetch one page of the product listing.
    async fn list_products(
        &self,
        request: &PageRequest,
        options: ReadOptions,
    ) -> Result<ReadOutcome<Paginated<Product>>, ProductReadError>;
}
