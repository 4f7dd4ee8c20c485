//! HTTP client for the catalog's JSON search endpoint (the structured tier).

mod items;
mod origin;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shelfscan_core::{FetchMethod, PageQuery, ProductRecord};

use crate::error::ScraperError;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::normalize::{build_record, RawItem};
use crate::politeness::random_user_agent;
use crate::rate_limit::retry_with_backoff;

pub(crate) use origin::rendered_search_url;
use origin::structured_search_url;

/// HTTP client for the catalog's `?ajax=true` search endpoint.
///
/// Each request carries a freshly rotated `User-Agent`. 429s and network
/// failures are retried with exponential backoff; any other status ≥ 400 or a
/// body that is not JSON ends the attempt so the coordinator can fall back to
/// the rendered tier.
pub struct CatalogClient {
    client: Client,
    origin: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a `CatalogClient` for `origin` with a request timeout and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        origin: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Fetches one page of raw items from the JSON endpoint.
    ///
    /// Returns `Ok(None)` when the body is JSON but has no item list at any
    /// known location.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ScraperError::UnexpectedStatus`] — any other status ≥ 400.
    /// - [`ScraperError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`] — the body is not JSON (typically an
    ///   HTML block page).
    /// - [`ScraperError::InvalidUrl`] — the origin/category pair is not a URL.
    pub async fn fetch_raw_items(&self, query: &PageQuery) -> Result<Option<Vec<Value>>, ScraperError> {
        let url = structured_search_url(&self.origin, query)?;
        let referer = format!("{}/", self.origin);

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let referer = referer.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::USER_AGENT, random_user_agent())
                    .header(
                        reqwest::header::ACCEPT,
                        "application/json, text/plain, */*",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::REFERER, &referer)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain: origin::extract_domain(&url),
                        retry_after_secs,
                    });
                }

                if status.as_u16() >= 400 {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Value>(&body).map_err(|e| ScraperError::Deserialize {
                    context: format!("search page from {url}"),
                    source: e,
                })
            }
        })
        .await?;

        Ok(items::locate_item_list(&body).map(|(pointer, items)| {
            tracing::debug!(pointer, count = items.len(), "located item list");
            items.to_vec()
        }))
    }

    /// Fetches one page and maps every item through the record builder,
    /// silently dropping items that fail to build.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_raw_items`].
    pub async fn search_page(&self, query: &PageQuery) -> Result<Option<Vec<ProductRecord>>, ScraperError> {
        let Some(items) = self.fetch_raw_items(query).await? else {
            return Ok(None);
        };
        let records = items
            .into_iter()
            .filter_map(|item| {
                build_record(
                    &RawItem::from_json(item),
                    FetchMethod::Structured,
                    &self.origin,
                )
            })
            .collect();
        Ok(Some(records))
    }
}

#[async_trait]
impl PageFetcher for CatalogClient {
    fn method(&self) -> FetchMethod {
        FetchMethod::Structured
    }

    async fn fetch(&self, query: &PageQuery) -> FetchOutcome {
        tracing::info!(query = %query.query, page = query.page, category = ?query.category, "structured fetch");
        match self.search_page(query).await {
            Ok(Some(records)) => {
                tracing::info!(page = query.page, count = records.len(), "structured fetch returned items");
                FetchOutcome::from_records(records)
            }
            Ok(None) => {
                tracing::info!(page = query.page, "no item list in JSON response");
                FetchOutcome::Empty
            }
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "structured fetch failed");
                FetchOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
