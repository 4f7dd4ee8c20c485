//! `shelfscan search`: builds the fetch pipeline once and runs one search.

use std::sync::Arc;
use std::time::Duration;

use shelfscan_core::{AppConfig, SearchRequest, SortOrder};
use shelfscan_db::PgCacheStore;
use shelfscan_scraper::{
    CatalogClient, FetchCoordinator, PolitenessDelay, RenderedFetcher, ResultCache,
    SearchAggregator, WebDriverClient,
};

use crate::output;
use crate::SearchArgs;

/// Page limit used by cheapest-first searches unless one is given.
const CHEAPEST_PAGE_LIMIT: u32 = 15;
/// Cheapest-first searches collect this many candidates per listing shown.
const CHEAPEST_POOL_FACTOR: usize = 10;

/// A resolved search: the request handed to the aggregator plus how many
/// records to show.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchPlan {
    pub request: SearchRequest,
    pub display_limit: usize,
}

/// Cheapest-first mode is explicit via `--cheapest` or implied by the word
/// "cheap" in the query.
pub(crate) fn wants_cheapest(args: &SearchArgs) -> bool {
    args.cheapest || args.query.to_lowercase().contains("cheap")
}

/// Merges CLI arguments with configured defaults.
///
/// Cheapest-first mode widens the candidate pool to `max_results × 10`
/// (with `max_results` defaulting to 1), raises the page limit, and sorts by
/// price before truncating back to `max_results`.
///
/// # Errors
///
/// Returns an error if `--max-results` or `--page-limit` is zero.
pub(crate) fn plan_search(args: &SearchArgs, config: &AppConfig) -> anyhow::Result<SearchPlan> {
    if args.max_results == Some(0) {
        anyhow::bail!("--max-results must be at least 1");
    }
    if args.page_limit == Some(0) {
        anyhow::bail!("--page-limit must be at least 1");
    }

    let (request, display_limit) = if wants_cheapest(args) {
        let shown = args.max_results.unwrap_or(1);
        let request = SearchRequest::new(
            args.query.clone(),
            shown.saturating_mul(CHEAPEST_POOL_FACTOR),
            args.page_limit.unwrap_or(CHEAPEST_PAGE_LIMIT),
        )
        .with_sort(SortOrder::PriceAscending);
        (request, shown)
    } else {
        let max_results = args.max_results.unwrap_or(config.max_results);
        let request = SearchRequest::new(
            args.query.clone(),
            max_results,
            args.page_limit.unwrap_or(config.page_limit),
        );
        (request, max_results)
    };

    let request = request
        .with_max_price(args.max_price)
        .with_category(args.category.as_deref())
        .with_deadline(args.timeout_secs.map(Duration::from_secs));

    Ok(SearchPlan {
        request,
        display_limit,
    })
}

/// Builds the result cache: Postgres when `DATABASE_URL` is set, otherwise
/// in-process.
///
/// A database that cannot be reached is logged and replaced by the
/// in-process store; the search itself never depends on the cache.
async fn build_cache(config: &AppConfig) -> ResultCache {
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    if config.database_url.is_none() {
        return ResultCache::in_memory(ttl);
    }

    match crate::cache::connect_and_migrate(config).await {
        Ok(pool) => {
            tracing::info!("using postgres result cache");
            ResultCache::new(Arc::new(PgCacheStore::new(pool)), ttl)
        }
        Err(e) => {
            tracing::warn!(error = %e, "postgres cache unavailable; using in-memory cache");
            ResultCache::in_memory(ttl)
        }
    }
}

/// Wires the structured client, rendered fetcher, coordinator and cache into
/// one aggregator.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub(crate) async fn build_aggregator(
    config: &AppConfig,
    use_cache: bool,
) -> anyhow::Result<SearchAggregator> {
    let structured = CatalogClient::new(
        &config.catalog_origin,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;

    let driver = config
        .webdriver_url
        .as_deref()
        .map(|url| WebDriverClient::new(url, Duration::from_secs(config.render_timeout_secs)))
        .transpose()?;
    if driver.is_none() {
        tracing::info!("SHELFSCAN_WEBDRIVER_URL not set; rendered fallback disabled");
    }
    let rendered = RenderedFetcher::new(
        driver,
        &config.catalog_origin,
        Duration::from_secs(config.render_timeout_secs),
        Duration::from_millis(config.render_settle_ms),
        config.max_items_per_page,
    );

    let cache = if use_cache {
        Some(build_cache(config).await)
    } else {
        None
    };

    Ok(
        SearchAggregator::new(FetchCoordinator::new(Arc::new(structured), Arc::new(rendered)))
            .with_cache(cache)
            .with_delay(PolitenessDelay::from_millis(
                config.delay_min_ms,
                config.delay_max_ms,
            )),
    )
}

/// Run `shelfscan search`.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the pipeline cannot be
/// built, or JSON output fails to serialize. Fetch failures are not errors:
/// they shorten the result list.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let plan = plan_search(args, config)?;
    let aggregator = build_aggregator(config, !args.no_cache).await?;

    let report = aggregator.search_with_report(&plan.request).await;
    let mut records = report.records;
    records.truncate(plan.display_limit);

    if report.diagnostics.cancelled {
        eprintln!("warning: search timed out; showing partial results");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", output::format_listing(&args.query, &records));
    }
    Ok(())
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
