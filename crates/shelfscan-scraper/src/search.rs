//! The page loop: pulls pages through the cache and coordinator until the
//! result target, the page limit, or an empty page is reached.

use shelfscan_core::{FetchMethod, PageQuery, ProductRecord, SearchRequest, SortOrder};

use crate::cache::ResultCache;
use crate::coordinator::FetchCoordinator;
use crate::fetcher::FetchOutcome;
use crate::politeness::PolitenessDelay;

/// How one page of a search was obtained and what it contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,
    pub from_cache: bool,
    /// Tier that supplied the page; `None` for cache hits.
    pub method: Option<FetchMethod>,
    /// Outcome labels (`"records"`, `"empty"`, `"failed"`) per tier tried.
    pub structured: Option<&'static str>,
    pub rendered: Option<&'static str>,
    /// Failure reasons from the tiers, in the order they were tried.
    pub failures: Vec<String>,
    /// Records the page produced before filtering.
    pub returned: usize,
    /// Records that passed the price ceiling and were kept.
    pub accepted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDiagnostics {
    pub pages_attempted: u32,
    pub last_page_attempted: Option<u32>,
    /// Tier used for the last page actually fetched (cache hits excluded).
    pub last_fetch_method: Option<FetchMethod>,
    pub cache_hits: u32,
    pub page_reports: Vec<PageReport>,
    /// The request's deadline expired before the loop finished.
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub records: Vec<ProductRecord>,
    pub diagnostics: SearchDiagnostics,
}

/// Runs searches against a [`FetchCoordinator`], optionally through a
/// [`ResultCache`], pausing between pages.
#[derive(Clone)]
pub struct SearchAggregator {
    coordinator: FetchCoordinator,
    cache: Option<ResultCache>,
    delay: PolitenessDelay,
}

impl SearchAggregator {
    #[must_use]
    pub fn new(coordinator: FetchCoordinator) -> Self {
        Self {
            coordinator,
            cache: None,
            delay: PolitenessDelay::default(),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Option<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: PolitenessDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Returns at most `request.max_results` records.
    ///
    /// Never fails: fetch problems end the loop early with whatever was
    /// collected so far.
    pub async fn search(&self, request: &SearchRequest) -> Vec<ProductRecord> {
        self.search_with_report(request).await.records
    }

    /// Like [`Self::search`], with per-page diagnostics.
    pub async fn search_with_report(&self, request: &SearchRequest) -> SearchReport {
        tracing::info!(
            query = %request.query,
            max_results = request.max_results,
            page_limit = request.page_limit,
            max_price = ?request.max_price,
            category = ?request.category,
            "search started"
        );

        let mut report = SearchReport::default();
        match request.deadline {
            Some(budget) => {
                if tokio::time::timeout(budget, self.run_pages(request, &mut report))
                    .await
                    .is_err()
                {
                    tracing::warn!(
                        budget_ms = budget.as_millis(),
                        collected = report.records.len(),
                        "search deadline reached; returning partial results"
                    );
                    report.diagnostics.cancelled = true;
                }
            }
            None => self.run_pages(request, &mut report).await,
        }

        if request.sort == SortOrder::PriceAscending {
            sort_by_price(&mut report.records);
        }
        report.records.truncate(request.max_results);

        tracing::info!(
            query = %request.query,
            count = report.records.len(),
            pages = report.diagnostics.pages_attempted,
            cache_hits = report.diagnostics.cache_hits,
            "search finished"
        );
        report
    }

    /// The page loop. Writes into `report` as it goes so a deadline that
    /// interrupts it leaves the pages already accepted in place.
    async fn run_pages(&self, request: &SearchRequest, report: &mut SearchReport) {
        let mut page = 1;
        while report.records.len() < request.max_results && page <= request.page_limit {
            let query = request.page_query(page);
            report.diagnostics.pages_attempted += 1;
            report.diagnostics.last_page_attempted = Some(page);

            let (results, mut page_report) = self.load_page(&query).await;
            if page_report.from_cache {
                report.diagnostics.cache_hits += 1;
            } else {
                report.diagnostics.last_fetch_method = page_report.method;
            }

            if results.is_empty() {
                tracing::info!(page, "page returned no results; stopping");
                report.diagnostics.page_reports.push(page_report);
                break;
            }

            for record in results {
                if !record.within_price(request.max_price) {
                    continue;
                }
                report.records.push(record);
                page_report.accepted += 1;
                if report.records.len() >= request.max_results {
                    break;
                }
            }
            tracing::debug!(
                page,
                returned = page_report.returned,
                accepted = page_report.accepted,
                "page processed"
            );
            report.diagnostics.page_reports.push(page_report);

            page += 1;
            if report.records.len() < request.max_results && page <= request.page_limit {
                self.delay.wait().await;
            }
        }
    }

    /// One page from the cache, or from the coordinator on a miss. Non-empty
    /// fetched pages are written back.
    async fn load_page(&self, query: &PageQuery) -> (Vec<ProductRecord>, PageReport) {
        let mut page_report = PageReport {
            page: query.page,
            from_cache: false,
            method: None,
            structured: None,
            rendered: None,
            failures: Vec::new(),
            returned: 0,
            accepted: 0,
        };

        if let Some(cache) = &self.cache {
            if let Some(records) = cache.get(query).await {
                page_report.from_cache = true;
                page_report.returned = records.len();
                return (records, page_report);
            }
        }

        let fetched = self.coordinator.fetch_page(query).await;
        page_report.method = Some(fetched.method);
        page_report.structured = Some(fetched.structured.kind());
        page_report.rendered = fetched.rendered.as_ref().map(FetchOutcome::kind);
        page_report.failures = [Some(&fetched.structured), fetched.rendered.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|outcome| match outcome {
                FetchOutcome::Failed { reason } => Some(reason.clone()),
                FetchOutcome::Records(_) | FetchOutcome::Empty => None,
            })
            .collect();
        page_report.returned = fetched.records.len();

        if let Some(cache) = &self.cache {
            if !fetched.records.is_empty() {
                cache.put(query, fetched.records.clone()).await;
            }
        }
        (fetched.records, page_report)
    }
}

/// Stable ascending sort by price. Records without a price are dropped.
fn sort_by_price(records: &mut Vec<ProductRecord>) {
    records.retain(|r| r.price.is_some());
    records.sort_by(|a, b| a.price.cmp(&b.price));
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
