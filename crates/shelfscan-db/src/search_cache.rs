//! Database operations for `search_cache`.

use chrono::{DateTime, Utc};
use shelfscan_scraper::CacheEntry;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `search_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchCacheRow {
    pub cache_key: String,
    pub query: String,
    pub page: i32,
    pub category: Option<String>,
    /// JSON array of serialized `ProductRecord`s.
    pub results: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SearchCacheRow {
    /// Flattens a cache entry into column values.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the records cannot be serialized.
    pub fn from_entry(entry: &CacheEntry) -> Result<Self, serde_json::Error> {
        Ok(Self {
            cache_key: entry.key.clone(),
            query: entry.query.query.clone(),
            page: i32::try_from(entry.query.page).unwrap_or(i32::MAX),
            category: entry.query.category.clone(),
            results: serde_json::to_value(&entry.results)?,
            created_at: entry.created_at,
            expires_at: entry.expires_at,
        })
    }

    /// Rebuilds the cache entry this row stores.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if `results` is not an array of records.
    pub fn into_entry(self) -> Result<CacheEntry, serde_json::Error> {
        let page = u32::try_from(self.page).unwrap_or(1);
        Ok(CacheEntry {
            key: self.cache_key,
            query: shelfscan_core::PageQuery::new(self.query, page, self.category.as_deref()),
            results: serde_json::from_value(self.results)?,
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

// ---------------------------------------------------------------------------
// search_cache operations
// ---------------------------------------------------------------------------

/// Fetch the row for `cache_key`, expired or not.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on database errors.
pub async fn get_search_cache_entry(
    pool: &PgPool,
    cache_key: &str,
) -> Result<Option<SearchCacheRow>, DbError> {
    let row = sqlx::query_as::<_, SearchCacheRow>(
        "SELECT cache_key, query, page, category, results, created_at, expires_at \
         FROM search_cache \
         WHERE cache_key = $1",
    )
    .bind(cache_key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert or replace the row for `row.cache_key`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on database errors.
pub async fn upsert_search_cache_entry(pool: &PgPool, row: &SearchCacheRow) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO search_cache \
             (cache_key, query, page, category, results, created_at, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (cache_key) DO UPDATE SET \
             query      = EXCLUDED.query, \
             page       = EXCLUDED.page, \
             category   = EXCLUDED.category, \
             results    = EXCLUDED.results, \
             created_at = EXCLUDED.created_at, \
             expires_at = EXCLUDED.expires_at",
    )
    .bind(&row.cache_key)
    .bind(&row.query)
    .bind(row.page)
    .bind(row.category.as_deref())
    .bind(&row.results)
    .bind(row.created_at)
    .bind(row.expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the row for `cache_key` only if it expired at or before `now`.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on database errors.
pub async fn delete_expired_entry(
    pool: &PgPool,
    cache_key: &str,
    now: DateTime<Utc>,
) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM search_cache WHERE cache_key = $1 AND expires_at <= $2")
        .bind(cache_key)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every row that expired at or before `now`.
///
/// Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on database errors.
pub async fn purge_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM search_cache WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
