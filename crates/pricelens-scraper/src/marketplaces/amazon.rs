//! Amazon adapter.

use crate::types::RawProduct;

use super::{
    encode_query, parse_listing_with, parse_product_with, ListingSelectors, Marketplace,
    ProductSelectors, SelectorChain,
};

const DEFAULT_BASE_URL: &str = "https://www.amazon.in";
const PLATFORM_TAG: &str = "Amazon";

/// Search-results selectors. Amazon's card layout has been stable for a
/// while; the chains are singletons until a new layout cohort shows up.
const LISTING: ListingSelectors = ListingSelectors {
    card: SelectorChain(&["div[data-component-type='s-search-result']"]),
    name: SelectorChain(&["h2 a span", "h2 span"]),
    link: SelectorChain(&["h2 a", "a.a-link-normal.s-no-outline"]),
    price: SelectorChain(&["span.a-price span.a-offscreen"]),
    rating: SelectorChain(&["span.a-icon-alt"]),
};

const PRODUCT: ProductSelectors = ProductSelectors {
    name: SelectorChain(&["#productTitle"]),
    price: SelectorChain(&[
        "#corePriceDisplay_desktop_feature_div .a-price span.a-offscreen",
        "span.a-price span.a-offscreen",
    ]),
    rating: SelectorChain(&["#averageCustomerReviews span.a-icon-alt"]),
};

pub struct Amazon {
    base_url: String,
}

impl Amazon {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Adapter pointed at an alternate origin, e.g. a local test server.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Amazon {
    fn default() -> Self {
        Self::new()
    }
}

impl Marketplace for Amazon {
    fn platform_tag(&self) -> &'static str {
        PLATFORM_TAG
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/s?k={}", self.base_url, encode_query(query))
    }

    fn parse_listing(&self, markup: &str) -> Vec<RawProduct> {
        parse_listing_with(&LISTING, &self.base_url, PLATFORM_TAG, markup)
    }

    fn parse_product(&self, markup: &str, url: &str) -> Option<RawProduct> {
        parse_product_with(&PRODUCT, PLATFORM_TAG, markup, url)
    }
}
