//! Product read service.
//!
//! Implements the [`ProductQuery`] driving port by routing each read through
//! the cache-aside orchestrator in front of the authoritative
//! [`ProductSource`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};
use tracing::debug;

use crate::domain::ports::{CacheStore, ProductQuery, ProductReadError, ProductSource};
use crate::domain::{CacheAside, Product, ProductId, QueryDescriptor, ReadOptions, ReadOutcome};

/// Operation prefix for single-product keys.
pub const PRODUCT_BY_ID_OPERATION: &str = "ProductById";
/// Operation prefix for listing keys.
pub const LIST_PRODUCTS_OPERATION: &str = "ListProducts";

/// Cached product reads over an authoritative source.
pub struct ProductReadService<S, C> {
    source: Arc<S>,
    cache: CacheAside<C>,
}

impl<S, C> Clone for ProductReadService<S, C> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: self.cache.clone(),
        }
    }
}

impl<S, C> ProductReadService<S, C> {
    /// Create a service reading from `source` through `cache`.
    pub fn new(source: Arc<S>, cache: CacheAside<C>) -> Self {
        Self { source, cache }
    }
}

#[async_trait]
impl<S, C> ProductQuery for ProductReadService<S, C>
where
    S: ProductSource + 'static,
    C: CacheStore + 'static,
{
    async fn get_product(
        &self,
        id: ProductId,
        options: ReadOptions,
    ) -> Result<ReadOutcome<Product>, ProductReadError> {
        let descriptor = QueryDescriptor::entity(id);
        let outcome = self
            .cache
            .read(PRODUCT_BY_ID_OPERATION, &descriptor, options, || {
                self.source.fetch_by_id(id)
            })
            .await?;
        debug!(product_id = %id, served_from_cache = outcome.served_from_cache, "product read");
        Ok(outcome)
    }

    async fn list_products(
        &self,
        request: &PageRequest,
        options: ReadOptions,
    ) -> Result<ReadOutcome<Paginated<Product>>, ProductReadError> {
        let descriptor = QueryDescriptor::pagination(request)?;
        let outcome = self
            .cache
            .read(LIST_PRODUCTS_OPERATION, &descriptor, options, || {
                self.source.fetch_page(request)
            })
            .await?;
        debug!(
            page = request.page(),
            size = request.size(),
            served_from_cache = outcome.served_from_cache,
            "product listing read"
        );
        Ok(outcome)
    }
}
