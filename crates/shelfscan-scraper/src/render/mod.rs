//! The rendered tier: loads the human-facing search page in a headless
//! browser and reads listing cards out of the resulting DOM.

pub mod extract;
pub mod webdriver;

use std::time::Duration;

use async_trait::async_trait;
use shelfscan_core::{FetchMethod, PageQuery, ProductRecord};

use crate::client::rendered_search_url;
use crate::error::ScraperError;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::normalize::build_record;
use crate::politeness::random_user_agent;

pub use extract::{extract_items, CARD_SELECTORS};
pub use webdriver::{WebDriverClient, WebDriverSession};

/// Selector polled while waiting for the page's scripts to populate results.
const SETTLE_SELECTOR: &str = r#"[data-qa-locator="product-item"], .gridItem, .product-item"#;

/// Browser-rendered fetcher.
///
/// Without a WebDriver endpoint the tier is disabled and every fetch fails
/// fast, so a search degrades to structured results only.
pub struct RenderedFetcher {
    driver: Option<WebDriverClient>,
    origin: String,
    render_timeout: Duration,
    settle: Duration,
    max_items: usize,
}

impl RenderedFetcher {
    #[must_use]
    pub fn new(
        driver: Option<WebDriverClient>,
        origin: &str,
        render_timeout: Duration,
        settle: Duration,
        max_items: usize,
    ) -> Self {
        Self {
            driver,
            origin: origin.trim_end_matches('/').to_owned(),
            render_timeout,
            settle,
            max_items,
        }
    }

    /// A rendered tier that never renders.
    #[must_use]
    pub fn disabled(origin: &str) -> Self {
        Self::new(None, origin, Duration::ZERO, Duration::ZERO, 0)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.driver.is_some()
    }

    /// Renders one search page and returns its page source.
    ///
    /// The browser session is closed on every path, including render timeout.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RendererUnavailable`] when no WebDriver is configured.
    /// - [`ScraperError::WebDriver`] when a protocol command fails.
    /// - [`ScraperError::RenderTimeout`] when the whole render exceeds its budget.
    pub async fn render_page(&self, query: &PageQuery) -> Result<String, ScraperError> {
        let driver = self
            .driver
            .as_ref()
            .ok_or(ScraperError::RendererUnavailable)?;
        let url = rendered_search_url(&self.origin, query)?;

        let session = driver.open_session(random_user_agent()).await?;
        let result = tokio::time::timeout(self.render_timeout, async {
            session.set_page_load_timeout(self.render_timeout).await?;
            session.navigate(&url).await?;
            if !session.wait_for(SETTLE_SELECTOR, self.settle).await {
                tracing::warn!(url = %url, "listing cards did not appear before settle deadline");
            }
            session.page_source().await
        })
        .await;
        session.close().await;

        result.unwrap_or_else(|_| {
            Err(ScraperError::RenderTimeout {
                url,
                timeout_secs: self.render_timeout.as_secs(),
            })
        })
    }

    /// Renders one page and maps its cards through the record builder.
    ///
    /// # Errors
    ///
    /// Same as [`Self::render_page`].
    pub async fn search_page(&self, query: &PageQuery) -> Result<Vec<ProductRecord>, ScraperError> {
        let html = self.render_page(query).await?;
        Ok(extract_items(&html, self.max_items)
            .iter()
            .filter_map(|raw| build_record(raw, FetchMethod::Rendered, &self.origin))
            .collect())
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    fn method(&self) -> FetchMethod {
        FetchMethod::Rendered
    }

    async fn fetch(&self, query: &PageQuery) -> FetchOutcome {
        if !self.is_enabled() {
            tracing::debug!(page = query.page, "rendered tier disabled");
            return FetchOutcome::failed(ScraperError::RendererUnavailable);
        }
        tracing::info!(query = %query.query, page = query.page, "rendered fetch");
        match self.search_page(query).await {
            Ok(records) => {
                tracing::info!(page = query.page, count = records.len(), "rendered fetch returned items");
                FetchOutcome::from_records(records)
            }
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "rendered fetch failed");
                FetchOutcome::failed(e)
            }
        }
    }
}
