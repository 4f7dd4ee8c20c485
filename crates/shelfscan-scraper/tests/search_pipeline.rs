//! End-to-end search through the real structured client, the coordinator
//! and the in-memory cache, against a `wiremock` catalog.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfscan_core::{FetchMethod, SearchRequest, SortOrder};
use shelfscan_scraper::{
    CatalogClient, FetchCoordinator, PolitenessDelay, RenderedFetcher, ResultCache,
    SearchAggregator,
};

fn page_body(page: u32, prices: &[u32]) -> serde_json::Value {
    let items: Vec<_> = prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            json!({
                "name": format!("Mouse {page}-{i}"),
                "priceShow": format!("Rs. {price}"),
                "itemUrl": format!("/products/mouse-{page}-{i}.html"),
            })
        })
        .collect();
    json!({ "mods": { "listItems": items } })
}

async fn mount_page(server: &MockServer, page: u32, prices: &[u32], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/catalog/"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(page, prices)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn aggregator(server: &MockServer) -> SearchAggregator {
    let structured = CatalogClient::new(&server.uri(), 5, 0, 0).expect("client");
    let rendered = RenderedFetcher::disabled(&server.uri());
    SearchAggregator::new(FetchCoordinator::new(
        Arc::new(structured),
        Arc::new(rendered),
    ))
    .with_cache(Some(ResultCache::in_memory(Duration::from_secs(600))))
    .with_delay(PolitenessDelay::none())
}

fn prices(records: &[shelfscan_core::ProductRecord]) -> Vec<Decimal> {
    records.iter().filter_map(|r| r.price).collect()
}

#[tokio::test]
async fn filtered_search_spans_pages_and_reuses_cache() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &[100, 200, 300, 400, 500], 1).await;
    mount_page(&server, 2, &[50, 600, 150], 1).await;

    let agg = aggregator(&server);
    let request = SearchRequest::new("mouse", 6, 2).with_max_price(Some(Decimal::from(300)));

    let first = agg.search_with_report(&request).await;
    assert_eq!(
        prices(&first.records),
        [100, 200, 300, 50, 150].map(Decimal::from).to_vec()
    );
    assert!(first
        .records
        .iter()
        .all(|r| r.fetch_method == FetchMethod::Structured));

    // Served entirely from cache: the mocks above expect exactly one call each.
    let second = agg.search_with_report(&request).await;
    assert_eq!(second.records, first.records);
    assert_eq!(second.diagnostics.cache_hits, 2);
}

#[tokio::test]
async fn blocked_endpoint_without_renderer_returns_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let report = aggregator(&server)
        .search_with_report(&SearchRequest::new("mouse", 5, 3))
        .await;

    assert!(report.records.is_empty());
    assert_eq!(report.diagnostics.pages_attempted, 1);
    let page = &report.diagnostics.page_reports[0];
    assert_eq!(page.structured, Some("failed"));
    assert_eq!(page.rendered, Some("failed"));
    assert_eq!(page.failures.len(), 2);
}

#[tokio::test]
async fn cheapest_first_across_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &[900, 300, 700], 1).await;
    mount_page(&server, 2, &[100, 800], 1).await;
    Mock::given(method("GET"))
        .and(path("/catalog/"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mods": { "listItems": [] } })))
        .mount(&server)
        .await;

    let request = SearchRequest::new("cheap mouse", 10, 15).with_sort(SortOrder::PriceAscending);
    let records = aggregator(&server).search(&request).await;

    assert_eq!(
        prices(&records),
        [100, 300, 700, 800, 900].map(Decimal::from).to_vec()
    );
}
