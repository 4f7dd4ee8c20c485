//! Offline unit tests for shelfscan-db pool configuration and row mapping.
//! These tests do not require a live database connection.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use shelfscan_core::{AppConfig, Environment, FetchMethod, PageQuery, ProductRecord};
use shelfscan_db::{PoolConfig, SearchCacheRow};
use shelfscan_scraper::{cache_key, CacheEntry};

fn app_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        catalog_origin: "https://www.daraz.pk".to_string(),
        request_timeout_secs: 15,
        max_retries: 1,
        retry_backoff_base_secs: 2,
        webdriver_url: None,
        render_timeout_secs: 30,
        render_settle_ms: 10_000,
        max_items_per_page: 20,
        cache_ttl_secs: 10_800,
        page_limit: 5,
        max_results: 10,
        delay_min_ms: 1000,
        delay_max_ms: 2000,
        database_url: Some("postgres://example".to_string()),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

fn entry(category: Option<&str>) -> CacheEntry {
    let query = PageQuery::new("wireless mouse", 3, category);
    let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    CacheEntry {
        key: cache_key(&query),
        query,
        results: vec![ProductRecord {
            name: "Wireless Mouse".to_string(),
            price: Some(Decimal::new(129_950, 2)),
            original_price: None,
            in_stock: None,
            url: "https://www.daraz.pk/products/mouse-i1.html".to_string(),
            fetch_method: FetchMethod::Rendered,
        }],
        created_at,
        expires_at: created_at + chrono::Duration::hours(3),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn row_preserves_entry_fields() {
    let original = entry(Some("computer-accessories"));

    let row = SearchCacheRow::from_entry(&original).expect("serialize");
    assert_eq!(row.page, 3);
    assert_eq!(row.category.as_deref(), Some("computer-accessories"));
    assert!(row.results.is_array());

    let restored = row.into_entry().expect("deserialize");
    assert_eq!(restored, original);
}

#[test]
fn row_without_category_maps_to_none() {
    let row = SearchCacheRow::from_entry(&entry(None)).expect("serialize");
    assert!(row.category.is_none());
    assert!(row.into_entry().expect("deserialize").query.category.is_none());
}

#[test]
fn malformed_results_are_rejected() {
    let mut row = SearchCacheRow::from_entry(&entry(None)).expect("serialize");
    row.results = serde_json::json!({ "not": "an array" });
    assert!(row.into_entry().is_err());
}
