use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which acquisition tier produced a record.
///
/// Provenance only: nothing downstream branches on it, but it is the first
/// thing to look at when the catalog changes shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// The catalog's JSON search endpoint.
    Structured,
    /// A browser render of the HTML search page.
    Rendered,
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMethod::Structured => write!(f, "structured"),
            FetchMethod::Rendered => write!(f, "rendered"),
        }
    }
}

/// Raw availability signal exactly as the catalog reported it.
///
/// The catalog mixes booleans, `"true"`/`"false"` strings and free text such
/// as `"Only 2 left"`, so the value is kept rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StockSignal {
    Flag(bool),
    Text(String),
}

impl StockSignal {
    /// Best-effort reading of the signal as "can be bought right now".
    ///
    /// Returns `None` when the text is not one of the recognised words.
    #[must_use]
    pub fn is_available(&self) -> Option<bool> {
        match self {
            StockSignal::Flag(flag) => Some(*flag),
            StockSignal::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "in stock" | "available" => Some(true),
                "false" | "0" | "no" | "out of stock" | "sold out" | "unavailable" => Some(false),
                _ => None,
            },
        }
    }
}

/// One catalog listing, normalized from either acquisition tier.
///
/// Only constructed through the record builder, which guarantees `name` and
/// `url` are non-empty and `url` is absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Current selling price; `None` when no candidate field parsed.
    pub price: Option<Decimal>,
    /// Pre-discount price, when the listing shows one.
    pub original_price: Option<Decimal>,
    pub in_stock: Option<StockSignal>,
    /// Absolute listing URL, e.g. `"https://www.daraz.pk/products/i123.html"`.
    pub url: String,
    pub fetch_method: FetchMethod,
}

impl ProductRecord {
    /// Discount relative to `original_price`, as a percentage rounded to one
    /// decimal place.
    ///
    /// Returns `None` unless both prices are present and the original is
    /// strictly higher than the current price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Decimal> {
        let price = self.price?;
        let original = self.original_price?;
        if original <= price || original.is_zero() {
            return None;
        }
        let pct = (original - price) / original * Decimal::ONE_HUNDRED;
        Some(pct.round_dp(1))
    }

    /// Returns `true` when the record passes an optional price ceiling.
    ///
    /// Records without a parsed price always pass: an unknown price is not
    /// evidence of exceeding the ceiling.
    #[must_use]
    pub fn within_price(&self, max_price: Option<Decimal>) -> bool {
        match (max_price, self.price) {
            (Some(max), Some(price)) => price <= max,
            _ => true,
        }
    }
}
