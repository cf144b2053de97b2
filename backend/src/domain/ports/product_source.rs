//! Port for the authoritative product store.
//!
//! The [`ProductSource`] is the source of truth behind the cache. Reads must
//! be idempotent; their errors propagate verbatim to callers of the product
//! query port because nothing sits beneath this source to fall back to.

use std::collections::BTreeMap;

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{Product, ProductId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by authoritative product source adapters.
    pub enum ProductSourceError {
        /// No product exists for the identifier.
        NotFound { id: u64 } => "product {id} not found",
        /// Store connection could not be established.
        Connection { message: String } => "product source connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "product source query failed: {message}",
    }
}

/// Authoritative product reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch a single product by identifier.
    async fn fetch_by_id(&self, id: ProductId) -> Result<Product, ProductSourceError>;

    /// Fetch one page of the product listing.
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Paginated<Product>, ProductSourceError>;
}

/// In-memory product source for tests and local wiring.
///
/// Listing applies equality filters on `name` and `owner_id`, orders by
/// identifier and slices by the request's offset and size. Sort expressions
/// are accepted but ignored.
#[derive(Debug, Default, Clone)]
pub struct FixtureProductSource {
    products: BTreeMap<ProductId, Product>,
}

impl FixtureProductSource {
    /// Build a source holding `products`.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
        }
    }

    fn matches(product: &Product, request: &PageRequest) -> bool {
        request
            .filters()
            .iter()
            .all(|(name, value)| match name.as_str() {
                "name" => product.name == *value,
                "ownerId" | "owner_id" => product.owner_id.to_string() == *value,
                _ => true,
            })
    }
}

#[async_trait]
impl ProductSource for FixtureProductSource {
    async fn fetch_by_id(&self, id: ProductId) -> Result<Product, ProductSourceError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| ProductSourceError::not_found(id.get()))
    }

    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> Result<Paginated<Product>, ProductSourceError> {
        let matching: Vec<&Product> = self
            .products
            .values()
            .filter(|product| Self::matches(product, request))
            .collect();
        let total = u64::try_from(matching.len())
            .map_err(|err| ProductSourceError::query(err.to_string()))?;
        let offset = usize::try_from(request.offset())
            .map_err(|err| ProductSourceError::query(err.to_string()))?;
        let size = usize::try_from(request.size())
            .map_err(|err| ProductSourceError::query(err.to_string()))?;
        let items = matching
            .into_iter()
            .skip(offset)
            .take(size)
            .cloned()
            .collect();
        Ok(Paginated::new(items, total, request))
    }
}
