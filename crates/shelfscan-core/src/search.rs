use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of one page fetch: the unit that is cached and handed to the
/// fetch coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageQuery {
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Catalog category slug, e.g. `"mobile-phones"`.
    pub category: Option<String>,
}

impl PageQuery {
    /// Builds a page query, clamping `page` to at least 1 and treating a
    /// blank category as absent.
    #[must_use]
    pub fn new(query: impl Into<String>, page: u32, category: Option<&str>) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Post-processing order applied after the page loop finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Page order, then the catalog's order within each page.
    #[default]
    SourceOrder,
    /// Cheapest first. Records without a parsed price are dropped.
    PriceAscending,
}

/// Caller-supplied parameters for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Records priced above this are skipped; unpriced records are kept.
    pub max_price: Option<Decimal>,
    /// Upper bound on returned records, and the page loop's target count.
    pub max_results: usize,
    /// Upper bound on pages fetched.
    pub page_limit: u32,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    /// Wall-clock budget for the whole search. When it runs out the page
    /// loop stops and returns what it has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, max_results: usize, page_limit: u32) -> Self {
        Self {
            query: query.into(),
            max_price: None,
            max_results,
            page_limit,
            category: None,
            sort: SortOrder::SourceOrder,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_max_price(mut self, max_price: Option<Decimal>) -> Self {
        self.max_price = max_price;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The page query for `page` of this search.
    #[must_use]
    pub fn page_query(&self, page: u32) -> PageQuery {
        PageQuery::new(self.query.clone(), page, self.category.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_clamps_page_to_one() {
        let q = PageQuery::new("mouse", 0, None);
        assert_eq!(q.page, 1);
    }

    #[test]
    fn page_query_drops_blank_category() {
        let q = PageQuery::new("mouse", 2, Some("  "));
        assert!(q.category.is_none());
        let q = PageQuery::new("mouse", 2, Some(" televisions "));
        assert_eq!(q.category.as_deref(), Some("televisions"));
    }

    #[test]
    fn search_request_builds_page_queries_with_category() {
        let req = SearchRequest::new("tv", 10, 3).with_category(Some("televisions"));
        let q = req.page_query(3);
        assert_eq!(q.query, "tv");
        assert_eq!(q.page, 3);
        assert_eq!(q.category.as_deref(), Some("televisions"));
    }

    #[test]
    fn search_request_defaults_to_source_order() {
        let req = SearchRequest::new("tv", 10, 3);
        assert_eq!(req.sort, SortOrder::SourceOrder);
        assert!(req.max_price.is_none());
        assert!(req.deadline.is_none());
    }
}
