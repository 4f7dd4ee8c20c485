//! Human-readable rendering of search results.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use shelfscan_core::{ProductRecord, StockSignal};

/// Formats a price as `Rs. 1,234` or `Rs. 1,234.50`.
pub(crate) fn format_price(price: Decimal) -> String {
    let price = price.round_dp(2).normalize();
    let text = price.abs().to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price.is_sign_negative() { "-" } else { "" };
    if frac.is_empty() {
        format!("Rs. {sign}{grouped}")
    } else {
        format!("Rs. {sign}{grouped}.{frac:0<2}")
    }
}

/// Recognised signals print as "In stock" or "Out of stock"; any other text
/// is shown as the catalog wrote it.
fn format_stock(stock: Option<&StockSignal>) -> String {
    let Some(signal) = stock else {
        return "Unknown".to_owned();
    };
    match (signal.is_available(), signal) {
        (Some(true), _) => "In stock".to_owned(),
        (Some(false), _) => "Out of stock".to_owned(),
        (None, StockSignal::Text(text)) => text.clone(),
        (None, StockSignal::Flag(_)) => "Unknown".to_owned(),
    }
}

/// Numbered listing: name, price with discount, stock and link per record.
pub(crate) fn format_listing(query: &str, records: &[ProductRecord]) -> String {
    if records.is_empty() {
        return format!("no results for \"{query}\"\n");
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} result(s) for \"{query}\"", records.len());
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {}", i + 1, record.name);

        let price = record
            .price
            .map_or_else(|| "unknown".to_owned(), format_price);
        match (record.discount_percent(), record.original_price) {
            (Some(pct), Some(original)) => {
                let _ = writeln!(
                    out,
                    "   Price: {price} ({pct}% off {})",
                    format_price(original)
                );
            }
            _ => {
                let _ = writeln!(out, "   Price: {price}");
            }
        }
        let _ = writeln!(out, "   Stock: {}", format_stock(record.in_stock.as_ref()));
        let _ = writeln!(out, "   URL:   {}", record.url);
    }
    out
}
