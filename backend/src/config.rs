//! Cache settings loaded via OrthoConfig.
//!
//! Values layer CLI arguments over `PRODUCT_CACHE_*` environment variables
//! over configuration files. Every field is optional; accessors supply the
//! defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{CachePolicy, EmptyPayloadPolicy};
use crate::outbound::cache::{RedisCacheConfig, TtlPolicy};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_TTL_JITTER_SECONDS: u64 = 30;
const DEFAULT_POOL_MAX_SIZE: u32 = 16;

/// Configuration for the product cache layer.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PRODUCT_CACHE")]
pub struct CacheSettings {
    /// Serve reads through the cache. When false every read goes to the
    /// source and nothing is written back.
    #[ortho_config(default = true)]
    pub enabled: bool,
    /// Redis connection URL.
    pub redis_url: Option<String>,
    /// Budget for each cache read, in milliseconds.
    pub read_timeout_ms: Option<u64>,
    /// Budget for each backfill write, in milliseconds.
    pub write_timeout_ms: Option<u64>,
    /// Base TTL of cached entries, in seconds.
    pub ttl_seconds: Option<u64>,
    /// Maximum random TTL extension, in seconds.
    pub ttl_jitter_seconds: Option<u64>,
    /// Maximum Redis pool size.
    pub pool_max_size: Option<u32>,
    /// Prefix applied to every stored key, e.g. `product:v1:`.
    pub namespace: Option<String>,
    /// Serve structurally empty cached payloads instead of re-fetching.
    #[ortho_config(default = false)]
    pub serve_empty_payloads: bool,
}

impl CacheSettings {
    /// Redis URL, falling back to a local instance.
    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    /// Cache read budget.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    /// Backfill write budget.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    /// TTL policy for stored entries.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::new(
            Duration::from_secs(self.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS)),
            Duration::from_secs(self.ttl_jitter_seconds.unwrap_or(DEFAULT_TTL_JITTER_SECONDS)),
        )
    }

    /// Orchestrator policy derived from these settings.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            read_budget: self.read_timeout(),
            write_budget: self.write_timeout(),
            enabled: self.enabled,
            empty_payload: if self.serve_empty_payloads {
                EmptyPayloadPolicy::ServeFromCache
            } else {
                EmptyPayloadPolicy::TreatAsMiss
            },
        }
    }

    /// Redis adapter configuration derived from these settings.
    pub fn redis_config(&self) -> RedisCacheConfig {
        let config = RedisCacheConfig::new(self.redis_url())
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
            .with_connection_timeout(self.read_timeout())
            .with_ttl(self.ttl_policy());
        match self.namespace.as_deref() {
            Some(namespace) => config.with_namespace(namespace),
            None => config,
        }
    }
}
