//! Cached payload contract and the structural emptiness predicate.

use pagination::Paginated;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Product;

/// Value that can be stored in and served from the cache.
///
/// `is_empty` is structural emptiness: a zero-value entity or a page with
/// no items. How an empty payload read from the cache is treated depends on
/// the [`EmptyPayloadPolicy`].
pub trait CachePayload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// True when the payload carries no data.
    fn is_empty(&self) -> bool;
}

impl CachePayload for Product {
    fn is_empty(&self) -> bool {
        self.is_unset()
    }
}

impl<T> CachePayload for Paginated<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn is_empty(&self) -> bool {
        Paginated::is_empty(self)
    }
}

/// How a structurally empty payload found in the cache is handled.
///
/// `TreatAsMiss` keeps the long-standing behaviour: an empty payload and a
/// missing key are indistinguishable, so zero-result listings are never
/// served from cache and always re-fetch. `ServeFromCache` serves them as
/// hits instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyPayloadPolicy {
    /// Empty payloads fall through to the authoritative source.
    #[default]
    TreatAsMiss,
    /// Empty payloads are legitimate cached answers.
    ServeFromCache,
}
