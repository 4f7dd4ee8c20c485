//! Mapping from raw catalog items to [`shelfscan_core::ProductRecord`].
//!
//! Both acquisition tiers produce a [`RawItem`]: the structured tier hands
//! over the JSON object as-is, the rendered tier assembles one from DOM text.
//! Field resolution walks an ordered list of candidate keys per field and
//! takes the first non-empty value, so a renamed key on the catalog side
//! degrades to the next candidate instead of an empty record.

use serde_json::{Map, Value};
use shelfscan_core::{FetchMethod, ProductRecord, StockSignal};

use crate::parse::normalize_price;

/// Candidate keys for the listing title.
pub const NAME_FIELDS: &[&str] = &["name", "title", "productName"];
/// Candidate keys for the current selling price.
pub const PRICE_FIELDS: &[&str] = &["priceShow", "price", "salePrice", "currentPrice"];
/// Candidate keys for the pre-discount price.
pub const ORIGINAL_PRICE_FIELDS: &[&str] = &["originalPrice", "listPrice", "marketPrice"];
/// Candidate keys for the listing link.
pub const URL_FIELDS: &[&str] = &["itemUrl", "link", "url"];
/// Candidate keys for the availability signal.
pub const STOCK_FIELDS: &[&str] = &["inStock", "stock", "available"];

/// One unprocessed catalog item, keyed by catalog field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem(Map<String, Value>);

impl RawItem {
    /// Wraps a JSON value. Non-object values yield an empty item, which the
    /// builder then rejects.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Sets `key` to a text value. Blank text is not stored.
    pub fn insert_text(&mut self, key: &str, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.0.insert(key.to_owned(), Value::String(text));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First candidate whose value renders as non-blank text.
    #[must_use]
    pub fn first_text(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find_map(|key| self.get(key).and_then(value_text))
    }

    /// First candidate holding a usable availability signal.
    #[must_use]
    pub fn first_stock(&self, candidates: &[&str]) -> Option<StockSignal> {
        candidates.iter().find_map(|key| match self.get(key)? {
            Value::Bool(flag) => Some(StockSignal::Flag(*flag)),
            other => value_text(other).map(StockSignal::Text),
        })
    }
}

/// Renders a scalar JSON value as trimmed, non-empty text.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Rewrites a catalog link into an absolute `http(s)` URL.
///
/// - `//host/path` gains an `https:` scheme.
/// - `/path` is prefixed with `origin`.
/// - Absolute `http(s)` URLs are returned unchanged.
/// - Other relative forms are resolved against `origin`.
/// - Non-web schemes (`javascript:`, `mailto:`) become an empty string, which
///   the record builder treats as "no URL".
#[must_use]
pub fn absolutize_url(raw: &str, origin: &str) -> String {
    let url = raw.trim();
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("//") {
        return format!("https:{url}");
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        return format!("{origin}{url}");
    }

    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => url.to_owned(),
        Ok(_) => String::new(),
        Err(_) => reqwest::Url::parse(&format!("{origin}/"))
            .and_then(|base| base.join(url))
            .map_or_else(|_| format!("{origin}/{url}"), |joined| joined.to_string()),
    }
}

/// Builds a [`ProductRecord`] from a raw item.
///
/// Returns `None` when the resolved name or URL is empty; such items are
/// dropped rather than emitted half-filled.
#[must_use]
pub fn build_record(raw: &RawItem, method: FetchMethod, origin: &str) -> Option<ProductRecord> {
    let name = raw.first_text(NAME_FIELDS)?;
    let url = raw
        .first_text(URL_FIELDS)
        .map(|u| absolutize_url(&u, origin))
        .filter(|u| !u.is_empty())?;

    let price = raw
        .first_text(PRICE_FIELDS)
        .and_then(|p| normalize_price(&p));
    let original_price = raw
        .first_text(ORIGINAL_PRICE_FIELDS)
        .and_then(|p| normalize_price(&p));

    Some(ProductRecord {
        name,
        price,
        original_price,
        in_stock: raw.first_stock(STOCK_FIELDS),
        url,
        fetch_method: method,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
