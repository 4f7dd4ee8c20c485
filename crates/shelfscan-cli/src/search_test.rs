use clap::Parser;
use rust_decimal::Decimal;
use shelfscan_core::Environment;

use super::*;
use crate::{Cli, Commands};

fn config() -> AppConfig {
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
        delay_min_ms: 0,
        delay_max_ms: 0,
        database_url: None,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
    }
}

fn args(argv: &[&str]) -> SearchArgs {
    let cli = Cli::try_parse_from(std::iter::once("shelfscan").chain(argv.iter().copied()))
        .expect("expected valid cli args");
    match cli.command {
        Commands::Search(args) => args,
        Commands::Cache { .. } => panic!("expected search command"),
    }
}

#[test]
fn plain_search_uses_configured_defaults() {
    let plan = plan_search(&args(&["search", "mouse"]), &config()).unwrap();

    assert_eq!(plan.request.max_results, 10);
    assert_eq!(plan.request.page_limit, 5);
    assert_eq!(plan.request.sort, SortOrder::SourceOrder);
    assert_eq!(plan.display_limit, 10);
    assert!(plan.request.deadline.is_none());
}

#[test]
fn explicit_flags_override_defaults() {
    let plan = plan_search(
        &args(&[
            "search",
            "mouse",
            "--max-results",
            "4",
            "--page-limit",
            "2",
            "--max-price",
            "999",
            "--category",
            "gaming",
            "--timeout-secs",
            "20",
        ]),
        &config(),
    )
    .unwrap();

    assert_eq!(plan.request.max_results, 4);
    assert_eq!(plan.request.page_limit, 2);
    assert_eq!(plan.request.max_price, Some(Decimal::from(999)));
    assert_eq!(plan.request.category.as_deref(), Some("gaming"));
    assert_eq!(plan.request.deadline, Some(Duration::from_secs(20)));
}

#[test]
fn cheap_in_query_enables_cheapest_mode() {
    let a = args(&["search", "Cheap wireless mouse"]);
    assert!(wants_cheapest(&a));

    let plan = plan_search(&a, &config()).unwrap();
    assert_eq!(plan.request.sort, SortOrder::PriceAscending);
    assert_eq!(plan.request.max_results, 10);
    assert_eq!(plan.request.page_limit, 15);
    assert_eq!(plan.display_limit, 1);
}

#[test]
fn cheapest_flag_widens_pool_by_requested_count() {
    let plan = plan_search(
        &args(&["search", "mouse", "--cheapest", "--max-results", "3"]),
        &config(),
    )
    .unwrap();

    assert_eq!(plan.request.max_results, 30);
    assert_eq!(plan.display_limit, 3);
}

#[test]
fn zero_limits_are_rejected() {
    assert!(plan_search(&args(&["search", "mouse", "--max-results", "0"]), &config()).is_err());
    assert!(plan_search(&args(&["search", "mouse", "--page-limit", "0"]), &config()).is_err());
}

#[tokio::test]
async fn aggregator_builds_without_webdriver_or_database() {
    let aggregator = build_aggregator(&config(), true).await;
    assert!(aggregator.is_ok());
}
