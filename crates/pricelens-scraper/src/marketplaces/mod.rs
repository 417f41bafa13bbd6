//! Marketplace adapters.
//!
//! Each marketplace implements [`Marketplace`]: build a search URL from a
//! query, parse listing markup into raw field sets, parse a single
//! product page. Markup structure drifts frequently and differs across
//! A/B-tested layout cohorts, so every extracted field is driven by a
//! [`SelectorChain`]: a fixed-priority list of CSS selectors where the
//! first non-empty match wins. The chains are configuration data on the
//! adapter, not per-call logic; adding a layout variant means appending a
//! selector, not editing parse code.

mod amazon;
mod flipkart;

pub use amazon::Amazon;
pub use flipkart::Flipkart;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{ElementRef, Html, Selector};

use crate::types::RawProduct;

/// A marketplace-specific extraction adapter.
///
/// Implementations are stateless beyond their base URL and selector
/// tables; the orchestrator drives them without knowing which
/// marketplace is behind the trait.
pub trait Marketplace: Send + Sync {
    /// Constant tag identifying the marketplace in output records.
    fn platform_tag(&self) -> &'static str;

    /// Builds the search-results URL for `query`. Pure; never fails for
    /// well-formed input.
    fn search_url(&self, query: &str) -> String;

    /// Parses search-result markup into raw products, in document order.
    ///
    /// A card that fails to yield a name and a link is skipped silently;
    /// partial markup is expected, not exceptional. Zero matching cards
    /// yields an empty vec, not an error. Result trimming is the
    /// caller's job so limit policy stays uniform across marketplaces.
    fn parse_listing(&self, markup: &str) -> Vec<RawProduct>;

    /// Parses a single product-detail page. `None` when no name element
    /// is found.
    fn parse_product(&self, markup: &str, url: &str) -> Option<RawProduct>;
}

/// Fixed-priority CSS selector list; tried in order, first non-empty
/// match wins.
pub(crate) struct SelectorChain(pub &'static [&'static str]);

/// Selector tables for a marketplace's search-results page.
pub(crate) struct ListingSelectors {
    pub card: SelectorChain,
    pub name: SelectorChain,
    pub link: SelectorChain,
    pub price: SelectorChain,
    pub rating: SelectorChain,
}

/// Selector tables for a marketplace's product-detail page.
pub(crate) struct ProductSelectors {
    pub name: SelectorChain,
    pub price: SelectorChain,
    pub rating: SelectorChain,
}

/// Shared listing parse driven entirely by selector tables.
pub(crate) fn parse_listing_with(
    selectors: &ListingSelectors,
    base_url: &str,
    platform: &'static str,
    markup: &str,
) -> Vec<RawProduct> {
    let document = Html::parse_document(markup);
    let cards = select_cards(&document, &selectors.card);

    let mut products = Vec::new();
    for card in cards {
        let name = select_first_text(card, &selectors.name);
        let href = select_first_attr(card, &selectors.link, "href");

        // Both the display name and a product link are required for a
        // listing entry to be usable downstream.
        let (Some(name), Some(href)) = (name, href) else {
            continue;
        };
        let Some(url) = resolve_url(base_url, &href) else {
            continue;
        };

        products.push(RawProduct {
            name: Some(name),
            price_text: select_first_text(card, &selectors.price),
            rating_text: select_first_text(card, &selectors.rating),
            url,
            platform,
        });
    }

    tracing::debug!(platform, count = products.len(), "parsed listing cards");
    products
}

/// Shared product-page parse driven by selector tables.
pub(crate) fn parse_product_with(
    selectors: &ProductSelectors,
    platform: &'static str,
    markup: &str,
    url: &str,
) -> Option<RawProduct> {
    let document = Html::parse_document(markup);
    let root = document.root_element();

    let name = select_first_text(root, &selectors.name)?;

    Some(RawProduct {
        name: Some(name),
        price_text: select_first_text(root, &selectors.price),
        rating_text: select_first_text(root, &selectors.rating),
        url: url.to_owned(),
        platform,
    })
}

/// Percent-encode a search query for interpolation into a URL template.
pub(crate) fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, NON_ALPHANUMERIC).to_string()
}

/// Returns the card elements matched by the first chain entry that
/// matches anything.
fn select_cards<'a>(document: &'a Html, chain: &SelectorChain) -> Vec<ElementRef<'a>> {
    for css in chain.0 {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        let cards: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

/// First non-empty text content under `scope` across the chain.
fn select_first_text(scope: ElementRef<'_>, chain: &SelectorChain) -> Option<String> {
    for css in chain.0 {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = scope.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First non-empty attribute value under `scope` across the chain.
fn select_first_attr(scope: ElementRef<'_>, chain: &SelectorChain, attr: &str) -> Option<String> {
    for css in chain.0 {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(value) = scope
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr))
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}

/// Resolves a possibly-relative href against the marketplace base URL.
fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
