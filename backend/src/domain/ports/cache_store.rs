//! Port for the remote key-value cache store.
//!
//! The store is an external service with its own TTL and eviction policy.
//! Adapters translate raw byte payloads to and from the backend; deadline
//! enforcement and payload encoding live in [`crate::domain::CacheClient`].
use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by cache store adapters.
    pub enum CacheStoreError {
        /// Store is unreachable or a connection could not be checked out.
        Connection { message: String } => "cache store connection failed: {message}",
        /// Store accepted the connection but rejected or failed the command.
        Command { message: String } => "cache store command failed: {message}",
    }
}

/// Remote key-value cache store.
///
/// A missing key is `Ok(None)`, never an error. No transactional or
/// multi-key guarantees are required; the store's own per-key atomicity is
/// assumed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the raw payload stored under `key`.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Store `value` under `key`, replacing any previous payload.
    async fn set(&self, key: &CacheKey, value: Vec<u8>) -> Result<(), CacheStoreError>;
}

/// Fixture store that always misses and discards writes.
///
/// Useful for wiring the read path without a cache backend; every query is
/// served from the authoritative source.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCacheStore;

#[async_trait]
impl CacheStore for FixtureCacheStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _value: Vec<u8>) -> Result<(), CacheStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn key() -> CacheKey {
        CacheKey::new("ProductById:1").expect("valid key")
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_store_always_misses(key: CacheKey) {
        let store = FixtureCacheStore;
        store.set(&key, b"{}".to_vec()).await.expect("set succeeds");

        let result = store.get(&key).await.expect("get succeeds");
        assert!(result.is_none(), "fixture store should always miss");
    }

    #[rstest]
    fn store_errors_format_their_message() {
        let err = CacheStoreError::connection("refused");
        assert_eq!(err.to_string(), "cache store connection failed: refused");
        let err = CacheStoreError::command("WRONGTYPE");
        assert_eq!(err.to_string(), "cache store command failed: WRONGTYPE");
    }
}
