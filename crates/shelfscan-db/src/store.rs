//! Postgres-backed [`CacheStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shelfscan_scraper::{CacheEntry, CacheError, CacheStore};
use sqlx::PgPool;

use crate::search_cache::{
    delete_expired_entry, get_search_cache_entry, upsert_search_cache_entry, SearchCacheRow,
};
use crate::DbError;

/// Persists cache entries in the `search_cache` table so they outlive the
/// process. TTL semantics are identical to the in-memory store.
#[derive(Debug, Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: DbError) -> CacheError {
    CacheError::Backend(e.to_string())
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let Some(row) = get_search_cache_entry(&self.pool, key)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };
        row.into_entry()
            .map(Some)
            .map_err(|source| CacheError::Serde {
                key: key.to_owned(),
                source,
            })
    }

    async fn store(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let row = SearchCacheRow::from_entry(&entry).map_err(|source| CacheError::Serde {
            key: entry.key.clone(),
            source,
        })?;
        upsert_search_cache_entry(&self.pool, &row)
            .await
            .map_err(backend)
    }

    async fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) -> Result<(), CacheError> {
        let deleted = delete_expired_entry(&self.pool, key, now)
            .await
            .map_err(backend)?;
        if deleted {
            tracing::debug!(cache_key = key, "evicted expired cache row");
        }
        Ok(())
    }
}
