//! Price text normalization.
//!
//! Catalog markup renders prices as anything from `"Rs. 1,299"` to
//! `"₨ 2,499.00 - 3,100"` to a bare JSON number. [`normalize_price`] reduces
//! all of them to a [`Decimal`] or a definite `None`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

/// Currency names, symbols and abbreviations for the catalog's local currency.
static CURRENCY_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rs\.?|pkr|₨|rupees?").expect("valid regex"));

/// Anything that cannot be part of a number.
static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d,.\-]").expect("valid regex"));

/// Numeric shapes, most specific first.
///
/// The four-digit floor on the bare-integer pattern keeps a stray `"1"` or
/// `"20"` fragment from winning when a longer amount appears later in the
/// same string.
static PRICE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // 1,234 / 1,234.50 / 12,345,678.90
        Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d{2})?").expect("valid regex"),
        // 1234.50
        Regex::new(r"\d+\.\d{2}").expect("valid regex"),
        // 1234
        Regex::new(r"\d{4,}").expect("valid regex"),
        // any remaining digit run
        Regex::new(r"\d+").expect("valid regex"),
    ]
});

/// Parses a price out of arbitrary currency-labelled text.
///
/// Currency markers (`Rs`, `Rs.`, `PKR`, `₨`, `rupee(s)`, any case) are
/// stripped, then every character other than digits, `,`, `.` and `-`. The
/// first pattern in [`PRICE_PATTERNS`] that matches and converts wins; comma
/// grouping is removed before conversion.
///
/// Returns `None` for empty input or text with no usable number. This is the
/// expected outcome for noisy markup, not an error.
#[must_use]
pub fn normalize_price(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_currency = CURRENCY_MARKERS.replace_all(trimmed, "");
    let numeric = NON_NUMERIC.replace_all(&without_currency, "");
    if numeric.is_empty() {
        return None;
    }

    PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find(&numeric)
            .and_then(|m| Decimal::from_str(&m.as_str().replace(',', "")).ok())
    })
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
