//! DOM extraction for rendered listing pages.
//!
//! Turns the page source of a rendered search page into [`RawItem`]s keyed
//! the same way as the JSON endpoint, so both tiers share one record builder.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::normalize::RawItem;

/// Listing card selectors, most specific first. The first one that matches
/// anything on the page is used for every card.
pub const CARD_SELECTORS: &[&str] = &[
    r#"[data-qa-locator="product-item"]"#,
    ".gridItem",
    ".product-item",
    r#"[data-qa-locator*="product"]"#,
    r#"[class*="product"]"#,
];

/// Longest product name kept from a card, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// How a field value is read from the first element matching a selector.
#[derive(Debug, Clone, Copy)]
enum Read {
    Attr(&'static str),
    Text,
}

struct Candidate {
    selector: Selector,
    read: Read,
}

fn candidates(entries: &[(&str, Read)]) -> Vec<Candidate> {
    entries
        .iter()
        .map(|(css, read)| Candidate {
            selector: Selector::parse(css).expect("valid selector"),
            read: *read,
        })
        .collect()
}

static CARDS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CARD_SELECTORS
        .iter()
        .map(|css| Selector::parse(css).expect("valid selector"))
        .collect()
});

static NAME: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[
        ("[title]", Read::Attr("title")),
        ("a[title]", Read::Attr("title")),
        ("h2", Read::Text),
        ("h3", Read::Text),
        ("a", Read::Text),
    ])
});

static PRICE: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[(r#"[class*="price"]"#, Read::Text), (".currency", Read::Text)])
});

static ORIGINAL_PRICE: LazyLock<Vec<Candidate>> = LazyLock::new(|| {
    candidates(&[("del", Read::Text), (r#"[class*="origin"]"#, Read::Text)])
});

static LINK: LazyLock<Vec<Candidate>> =
    LazyLock::new(|| candidates(&[("a[href]", Read::Attr("href"))]));

static STOCK: LazyLock<Vec<Candidate>> =
    LazyLock::new(|| candidates(&[(r#"[class*="stock"]"#, Read::Text)]));

/// Collapses runs of whitespace and trims.
fn clean_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-blank value from the ordered candidates, searched inside `card`.
fn first_value(card: ElementRef<'_>, candidates: &[Candidate]) -> Option<String> {
    candidates.iter().find_map(|c| {
        card.select(&c.selector).find_map(|el| {
            let value = match c.read {
                Read::Attr(name) => el.value().attr(name)?.trim().to_owned(),
                Read::Text => clean_text(el),
            };
            (!value.is_empty()).then_some(value)
        })
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

/// Reads one card into a raw item.
///
/// # Errors
///
/// Returns [`ScraperError::Extraction`] when the card has neither a name nor
/// a link, which means the card selector matched page chrome rather than a
/// listing.
fn extract_card(card: ElementRef<'_>) -> Result<RawItem, ScraperError> {
    let name = first_value(card, &NAME);
    let link = first_value(card, &LINK);
    if name.is_none() && link.is_none() {
        return Err(ScraperError::Extraction {
            reason: format!("<{}> has no name or link", card.value().name()),
        });
    }

    let mut item = RawItem::default();
    if let Some(name) = name {
        item.insert_text("name", truncate_chars(&name, MAX_NAME_CHARS));
    }
    if let Some(link) = link {
        item.insert_text("url", link);
    }
    if let Some(price) = first_value(card, &PRICE) {
        item.insert_text("price", price);
    }
    if let Some(original) = first_value(card, &ORIGINAL_PRICE) {
        item.insert_text("originalPrice", original);
    }
    item.insert_text(
        "stock",
        first_value(card, &STOCK).unwrap_or_else(|| "Available".to_owned()),
    );
    Ok(item)
}

/// Extracts at most `max_items` listing cards from a rendered page.
///
/// Only the first `max_items` matched cards are processed. A card that fails
/// to extract is logged and skipped but still counts toward the cap, so an
/// over-broad card selector cannot make one page walk the whole document.
#[must_use]
pub fn extract_items(html: &str, max_items: usize) -> Vec<RawItem> {
    let document = Html::parse_document(html);

    let Some((css, selector)) = CARD_SELECTORS
        .iter()
        .zip(CARDS.iter())
        .find(|(_, sel)| document.select(sel).next().is_some())
    else {
        tracing::info!("no listing cards found in rendered page");
        return Vec::new();
    };
    tracing::debug!(selector = css, "matched listing cards");

    document
        .select(selector)
        .take(max_items)
        .filter_map(|card| match extract_card(card) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "skipping listing card");
                None
            }
        })
        .collect()
}
