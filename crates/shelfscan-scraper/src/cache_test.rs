use chrono::TimeZone;
use shelfscan_core::FetchMethod;

use super::*;

fn record(name: &str) -> ProductRecord {
    ProductRecord {
        name: name.to_owned(),
        price: None,
        original_price: None,
        in_stock: None,
        url: format!("https://www.daraz.pk/p/{name}"),
        fetch_method: FetchMethod::Structured,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn cache_with_store(ttl_secs: u64) -> (ResultCache, Arc<MemoryCacheStore>) {
    let store = Arc::new(MemoryCacheStore::new());
    let cache = ResultCache::new(store.clone(), Duration::from_secs(ttl_secs));
    (cache, store)
}

#[test]
fn key_is_stable_and_distinguishes_fields() {
    let a = PageQuery::new("mouse", 1, None);
    assert_eq!(cache_key(&a), cache_key(&a.clone()));
    assert_eq!(cache_key(&a).len(), 64);

    assert_ne!(cache_key(&a), cache_key(&PageQuery::new("mouse", 2, None)));
    assert_ne!(
        cache_key(&a),
        cache_key(&PageQuery::new("mouse", 1, Some("computers")))
    );
    assert_ne!(cache_key(&a), cache_key(&PageQuery::new("mice", 1, None)));
}

#[tokio::test]
async fn put_then_get_returns_records() {
    let (cache, _) = cache_with_store(60);
    let q = PageQuery::new("mouse", 1, None);

    cache.put_at(&q, vec![record("a"), record("b")], t0()).await;
    let hit = cache
        .get_at(&q, t0() + chrono::Duration::seconds(59))
        .await
        .unwrap();

    assert_eq!(hit.len(), 2);
    assert_eq!(hit[0].name, "a");
}

#[tokio::test]
async fn expired_entry_is_a_miss_and_is_evicted() {
    let (cache, store) = cache_with_store(60);
    let q = PageQuery::new("mouse", 1, None);

    cache.put_at(&q, vec![record("a")], t0()).await;
    assert!(store.contains_key(&cache_key(&q)));

    // Freshness is strict: exactly at expires_at is already stale.
    let miss = cache.get_at(&q, t0() + chrono::Duration::seconds(60)).await;
    assert!(miss.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn put_overwrites_with_fresh_timestamps() {
    let (cache, store) = cache_with_store(60);
    let q = PageQuery::new("mouse", 1, None);

    cache.put_at(&q, vec![record("old")], t0()).await;
    let later = t0() + chrono::Duration::seconds(45);
    cache.put_at(&q, vec![record("new")], later).await;

    let entry = store.load(&cache_key(&q)).await.unwrap().unwrap();
    assert_eq!(entry.created_at, later);
    assert_eq!(entry.expires_at, later + chrono::Duration::seconds(60));
    assert_eq!(entry.results[0].name, "new");
    assert_eq!(store.len(), 1);

    // Still fresh past the first entry's expiry.
    let hit = cache.get_at(&q, t0() + chrono::Duration::seconds(90)).await;
    assert!(hit.is_some());
}

#[tokio::test]
async fn eviction_spares_fresh_entry() {
    let store = MemoryCacheStore::new();
    let q = PageQuery::new("mouse", 1, None);
    let entry = CacheEntry {
        key: cache_key(&q),
        query: q,
        results: vec![record("a")],
        created_at: t0(),
        expires_at: t0() + chrono::Duration::seconds(60),
    };
    store.store(entry.clone()).await.unwrap();

    store.evict_if_expired(&entry.key, t0()).await.unwrap();
    assert_eq!(store.len(), 1);

    store
        .evict_if_expired(&entry.key, entry.expires_at)
        .await
        .unwrap();
    assert!(store.is_empty());
}

struct BrokenStore;

#[async_trait]
impl CacheStore for BrokenStore {
    async fn load(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Err(CacheError::Backend("connection refused".to_owned()))
    }

    async fn store(&self, _entry: CacheEntry) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_owned()))
    }

    async fn evict_if_expired(&self, _key: &str, _now: DateTime<Utc>) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_owned()))
    }
}

#[tokio::test]
async fn store_failures_degrade_to_miss() {
    let cache = ResultCache::new(Arc::new(BrokenStore), Duration::from_secs(60));
    let q = PageQuery::new("mouse", 1, None);

    cache.put(&q, vec![record("a")]).await;
    assert!(cache.get(&q).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_access_keeps_every_key_and_one_shared_winner() {
    let (cache, store) = cache_with_store(60);
    let shared = PageQuery::new("shared", 1, None);
    let mut tasks = tokio::task::JoinSet::new();

    for i in 0..16u32 {
        let cache = cache.clone();
        let shared = shared.clone();
        tasks.spawn(async move {
            let own = PageQuery::new(format!("query-{i}"), 1, None);
            cache.put(&own, vec![record(&format!("own-{i}"))]).await;
            cache.put(&shared, vec![record(&format!("shared-{i}"))]).await;
            let own_hit = cache.get(&own).await;
            let _ = cache.get(&shared).await;
            own_hit
        });
    }

    let mut own_hits = 0;
    while let Some(joined) = tasks.join_next().await {
        let hit = joined.unwrap().expect("own key readable after its write");
        assert_eq!(hit.len(), 1);
        assert!(hit[0].name.starts_with("own-"));
        own_hits += 1;
    }
    assert_eq!(own_hits, 16);
    assert_eq!(store.len(), 17);

    for i in 0..16u32 {
        let hit = cache
            .get(&PageQuery::new(format!("query-{i}"), 1, None))
            .await
            .unwrap();
        assert_eq!(hit[0].name, format!("own-{i}"));
    }

    let winner = cache.get(&shared).await.unwrap();
    assert_eq!(winner.len(), 1);
    let name = &winner[0].name;
    assert!(
        (0..16).any(|i| *name == format!("shared-{i}")),
        "unexpected shared value {name}"
    );
}
