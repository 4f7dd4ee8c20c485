//! Tier ordering for a single page: structured first, rendered only when the
//! structured tier produced nothing.

use std::sync::Arc;

use shelfscan_core::{FetchMethod, PageQuery, ProductRecord};

use crate::fetcher::{FetchOutcome, PageFetcher};

/// What happened while fetching one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFetch {
    pub records: Vec<ProductRecord>,
    /// Tier whose outcome supplied `records`: the last tier tried.
    pub method: FetchMethod,
    pub structured: FetchOutcome,
    /// `None` when the structured tier succeeded and rendering was skipped.
    pub rendered: Option<FetchOutcome>,
}

impl PageFetch {
    fn from_structured(outcome: FetchOutcome) -> Self {
        Self {
            records: outcome.records().to_vec(),
            method: FetchMethod::Structured,
            structured: outcome,
            rendered: None,
        }
    }
}

/// Runs the two tiers in order. Never interleaves or races them.
#[derive(Clone)]
pub struct FetchCoordinator {
    structured: Arc<dyn PageFetcher>,
    rendered: Arc<dyn PageFetcher>,
}

impl FetchCoordinator {
    #[must_use]
    pub fn new(structured: Arc<dyn PageFetcher>, rendered: Arc<dyn PageFetcher>) -> Self {
        Self {
            structured,
            rendered,
        }
    }

    /// Fetches one page, falling back to the rendered tier when the
    /// structured tier is empty or failed.
    pub async fn fetch_page(&self, query: &PageQuery) -> PageFetch {
        let structured = self.structured.fetch(query).await;
        if structured.has_records() {
            return PageFetch::from_structured(structured);
        }

        tracing::info!(
            page = query.page,
            structured = structured.kind(),
            "falling back to rendered fetch"
        );
        let rendered = self.rendered.fetch(query).await;
        PageFetch {
            records: rendered.records().to_vec(),
            method: self.rendered.method(),
            structured,
            rendered: Some(rendered),
        }
    }
}
