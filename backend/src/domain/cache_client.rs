//! Deadline-bounded, typed access to the cache store.
//!
//! The client wraps a [`CacheStore`] and adds the two things every caller
//! needs: a hard per-call deadline and JSON encoding of payloads. A miss is
//! `Ok(None)`; store failures, undecodable payloads and expired deadlines are
//! errors so callers can tell them apart from misses.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::Deadline;
use super::ports::{CacheKey, CacheStore, CacheStoreError};

/// Failures of a single cache client call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheClientError {
    /// The call did not finish before its deadline.
    #[error("cache call exceeded its {budget_ms}ms deadline")]
    Timeout {
        /// Budget the deadline was created with, in milliseconds.
        budget_ms: u64,
    },
    /// The store reported a failure.
    #[error(transparent)]
    Store(#[from] CacheStoreError),
    /// The payload could not be encoded for storage.
    #[error("failed to encode cache payload: {message}")]
    Encode {
        /// Encoder failure description.
        message: String,
    },
    /// The stored payload could not be decoded.
    #[error("failed to decode cache payload: {message}")]
    Decode {
        /// Decoder failure description.
        message: String,
    },
}

impl CacheClientError {
    fn timeout(deadline: Deadline) -> Self {
        Self::Timeout {
            budget_ms: u64::try_from(deadline.budget().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Typed cache client with explicit deadlines.
pub struct CacheClient<S> {
    store: Arc<S>,
}

impl<S> Clone for CacheClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> CacheClient<S> {
    /// Create a client over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> CacheClient<S>
where
    S: CacheStore,
{
    /// Read and decode the payload stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss. The store is not called once the
    /// deadline has already passed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheClientError::Timeout`] when the deadline passes,
    /// [`CacheClientError::Store`] when the store fails and
    /// [`CacheClientError::Decode`] when the stored bytes are not a valid `T`.
    pub async fn get<T>(
        &self,
        deadline: Deadline,
        key: &CacheKey,
    ) -> Result<Option<T>, CacheClientError>
    where
        T: DeserializeOwned,
    {
        if deadline.is_expired() {
            return Err(CacheClientError::timeout(deadline));
        }
        let raw = tokio::time::timeout_at(deadline.instant(), self.store.get(key))
            .await
            .map_err(|_| CacheClientError::timeout(deadline))??;
        raw.map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|err| CacheClientError::Decode {
                message: err.to_string(),
            })
        })
        .transpose()
    }

    /// Encode `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheClientError::Encode`] when serialisation fails,
    /// [`CacheClientError::Timeout`] when the deadline passes and
    /// [`CacheClientError::Store`] when the store fails.
    pub async fn set<T>(
        &self,
        deadline: Deadline,
        key: &CacheKey,
        value: &T,
    ) -> Result<(), CacheClientError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value).map_err(|err| CacheClientError::Encode {
            message: err.to_string(),
        })?;
        if deadline.is_expired() {
            return Err(CacheClientError::timeout(deadline));
        }
        tokio::time::timeout_at(deadline.instant(), self.store.set(key, bytes))
            .await
            .map_err(|_| CacheClientError::timeout(deadline))??;
        Ok(())
    }
}
