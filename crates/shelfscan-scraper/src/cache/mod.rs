//! Page-level result cache with TTL checked on read.

mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shelfscan_core::{PageQuery, ProductRecord};

use crate::error::CacheError;

pub use memory::MemoryCacheStore;

/// One cached page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub query: PageQuery,
    pub results: Vec<ProductRecord>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Stable cache key for a page query: hex SHA-256 of query, page and
/// category joined by a unit separator.
#[must_use]
pub fn cache_key(query: &PageQuery) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.query.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(query.page.to_string().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(query.category.as_deref().unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Storage backend for [`ResultCache`].
///
/// Stores know nothing about TTL policy; they persist entries and evict on
/// request.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Inserts or replaces the entry under `entry.key`.
    async fn store(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Removes the entry under `key` only if it expired at or before `now`,
    /// so a fresh entry written concurrently survives.
    async fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) -> Result<(), CacheError>;
}

/// TTL policy over a [`CacheStore`].
///
/// Store failures never surface: a failed read is a miss, a failed write
/// leaves the page uncached.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// In-process cache backed by [`MemoryCacheStore`].
    #[must_use]
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCacheStore::new()), ttl)
    }

    /// Cached records for `query`, if present and not expired. An expired
    /// entry is evicted.
    pub async fn get(&self, query: &PageQuery) -> Option<Vec<ProductRecord>> {
        self.get_at(query, Utc::now()).await
    }

    pub(crate) async fn get_at(
        &self,
        query: &PageQuery,
        now: DateTime<Utc>,
    ) -> Option<Vec<ProductRecord>> {
        let key = cache_key(query);
        let entry = match self.store.load(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "cache read failed");
                return None;
            }
        };

        if entry.is_fresh_at(now) {
            tracing::debug!(page = query.page, count = entry.results.len(), "cache hit");
            return Some(entry.results);
        }

        tracing::debug!(page = query.page, expired_at = %entry.expires_at, "cache entry expired");
        if let Err(e) = self.store.evict_if_expired(&key, now).await {
            tracing::warn!(page = query.page, error = %e, "cache eviction failed");
        }
        None
    }

    /// Writes `records` for `query` with fresh timestamps, replacing any
    /// existing entry.
    pub async fn put(&self, query: &PageQuery, records: Vec<ProductRecord>) {
        self.put_at(query, records, Utc::now()).await;
    }

    pub(crate) async fn put_at(
        &self,
        query: &PageQuery,
        records: Vec<ProductRecord>,
        now: DateTime<Utc>,
    ) {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let entry = CacheEntry {
            key: cache_key(query),
            query: query.clone(),
            results: records,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        if let Err(e) = self.store.store(entry).await {
            tracing::warn!(page = query.page, error = %e, "cache write failed");
        }
    }
}

#[cfg(test)]
#[path = "../cache_test.rs"]
mod tests;
