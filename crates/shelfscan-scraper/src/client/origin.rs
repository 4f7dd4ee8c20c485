//! Catalog URL construction shared by both acquisition tiers.

use shelfscan_core::PageQuery;

use crate::error::ScraperError;

/// The listing path for a page query: `/catalog/` for a plain search,
/// `/{category}/` for a category-scoped one.
fn listing_base(origin: &str, query: &PageQuery) -> Result<reqwest::Url, ScraperError> {
    let origin = origin.trim_end_matches('/');
    let base = match query.category.as_deref().map(|c| c.trim_matches('/')) {
        Some(category) if !category.is_empty() => format!("{origin}/{category}/"),
        _ => format!("{origin}/catalog/"),
    };
    reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidUrl {
        url: base.clone(),
        reason: e.to_string(),
    })
}

/// Builds the JSON search URL for one page.
///
/// - Search: `{origin}/catalog/?q=…&ajax=true&page=N&_keyori=ss`
/// - Category: `{origin}/{category}/?ajax=true&page=N[&q=…]`
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the origin/category pair does not
/// form a valid URL.
pub(crate) fn structured_search_url(
    origin: &str,
    query: &PageQuery,
) -> Result<String, ScraperError> {
    let mut url = listing_base(origin, query)?;
    {
        let mut pairs = url.query_pairs_mut();
        if query.category.is_some() {
            pairs
                .append_pair("ajax", "true")
                .append_pair("page", &query.page.to_string());
            if !query.query.trim().is_empty() {
                pairs.append_pair("q", &query.query);
            }
        } else {
            pairs
                .append_pair("q", &query.query)
                .append_pair("ajax", "true")
                .append_pair("page", &query.page.to_string())
                .append_pair("_keyori", "ss");
        }
    }
    Ok(url.to_string())
}

/// Builds the human-facing HTML search URL for one page, as loaded by the
/// rendered tier: `{origin}/catalog/?q=…&page=N` or
/// `{origin}/{category}/?q=…&page=N`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the origin/category pair does not
/// form a valid URL.
pub(crate) fn rendered_search_url(origin: &str, query: &PageQuery) -> Result<String, ScraperError> {
    let mut url = listing_base(origin, query)?;
    url.query_pairs_mut()
        .append_pair("q", &query.query)
        .append_pair("page", &query.page.to_string());
    Ok(url.to_string())
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
