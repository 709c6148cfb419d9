use crate::models::Company;
use crate::services::catalog::CatalogQuery;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// In-memory cache for catalog pages
///
/// Entries are stored as JSON bytes and expire after the configured TTL, so
/// repeated searches while the user is typing don't refetch the catalog.
pub struct CacheManager {
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { l1_cache, ttl_secs }
    }

    /// Get a value from cache
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.l1_cache.get(key).await {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::CacheMiss(key.to_string()))
            }
        }
    }

    /// Set a value in cache
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.l1_cache.insert(key.to_string(), bytes).await;

        tracing::trace!("Cache set: {} (ttl {}s)", key, self.ttl_secs);
        Ok(())
    }

    /// Delete a value
    pub async fn delete(&self, key: &str) {
        self.l1_cache.invalidate(key).await;
    }

    /// Cached companies for a catalog query, if present
    pub async fn companies(&self, query: &CatalogQuery) -> Option<Vec<Company>> {
        let key = CacheKey::catalog(query);
        match self.get::<Vec<Company>>(&key).await {
            Ok(companies) => Some(companies),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                self.delete(&key).await;
                None
            }
        }
    }

    pub async fn store_companies(&self, query: &CatalogQuery, companies: &[Company]) {
        let key = CacheKey::catalog(query);
        if let Err(e) = self.set(&key, &companies).await {
            tracing::warn!("Failed to cache catalog page {}: {}", key, e);
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.l1_cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a catalog page
    pub fn catalog(query: &CatalogQuery) -> String {
        format!("catalog:{}", query.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(search: &str) -> CatalogQuery {
        CatalogQuery {
            limit: 15,
            search: Some(search.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = CacheManager::new(100, 60);

        cache.set("key", &"value").await.unwrap();
        let result: String = cache.get("key").await.unwrap();
        assert_eq!(result, "value");

        cache.delete("key").await;
        assert!(matches!(
            cache.get::<String>("key").await,
            Err(CacheError::CacheMiss(_))
        ));
    }

    #[test]
    fn test_companies_round_through_cache() {
        tokio_test::block_on(async {
            let cache = CacheManager::new(100, 60);
            let company: Company =
                serde_json::from_str(r#"{"_id":"c1","name":"Nest Interiors","assured":true}"#).unwrap();

            assert!(cache.companies(&query("nest")).await.is_none());

            cache.store_companies(&query("nest"), &[company]).await;
            let cached = cache.companies(&query("nest")).await.unwrap();

            assert_eq!(cached.len(), 1);
            assert_eq!(cached[0].name.as_deref(), Some("Nest Interiors"));
            assert!(cached[0].assured);
            assert!(cache.companies(&query("other")).await.is_none());
        });
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::catalog(&query("Nest")), "catalog:limit=15&search=Nest");
        assert_ne!(CacheKey::catalog(&query("Nest")), CacheKey::catalog(&query("nest")));
    }
}
