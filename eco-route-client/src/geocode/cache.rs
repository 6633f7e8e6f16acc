//! Caching layer for geocoding lookups.
//!
//! Users often retype or revisit the same address while editing a form.
//! Successful lookups are cached per normalised query so repeats skip the
//! provider; failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::debug;

use super::error::GeocodeError;
use super::search::Geocoder;
use super::types::GeocodeResult;

/// Cache key: (lowercased trimmed query, result limit).
type QueryKey = (String, usize);

/// Configuration for the geocode cache.
#[derive(Debug, Clone)]
pub struct GeocodeCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached queries.
    pub max_capacity: u64,
}

impl Default for GeocodeCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 500,
        }
    }
}

/// Geocoder with caching.
///
/// Wraps any `Geocoder` and caches its successful responses.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: MokaCache<QueryKey, Arc<Vec<GeocodeResult>>>,
}

impl<G> CachedGeocoder<G> {
    /// Create a new cached geocoder.
    pub fn new(inner: G, config: &GeocodeCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Access the wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

fn cache_key(query: &str, limit: usize) -> QueryKey {
    (query.trim().to_lowercase(), limit)
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let key = cache_key(query, limit);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(query, "geocode cache hit");
            return Ok(cached.as_ref().clone());
        }

        let results = self.inner.geocode(query, limit).await?;
        self.cache.insert(key, Arc::new(results.clone())).await;

        Ok(results)
    }
}
