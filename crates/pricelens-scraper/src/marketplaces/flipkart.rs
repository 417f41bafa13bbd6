//! Flipkart adapter.
//!
//! Flipkart serves at least two listing layouts per experiment cohort
//! (grid cards vs. full-width rows), with obfuscated class names that
//! rotate on redesigns. Every field chain below carries the currently
//! observed class plus the previous generation as fallback.

use crate::types::RawProduct;

use super::{
    encode_query, parse_listing_with, parse_product_with, ListingSelectors, Marketplace,
    ProductSelectors, SelectorChain,
};

const DEFAULT_BASE_URL: &str = "https://www.flipkart.com";
const PLATFORM_TAG: &str = "Flipkart";

const LISTING: ListingSelectors = ListingSelectors {
    card: SelectorChain(&["div._13oc-S", "div._1AtVbE"]),
    name: SelectorChain(&["div._4rR01T", "a.s1Q9rs"]),
    link: SelectorChain(&["a._1fQZEK", "a.s1Q9rs"]),
    price: SelectorChain(&["div._30jeq3"]),
    rating: SelectorChain(&["div._3LWZlK"]),
};

const PRODUCT: ProductSelectors = ProductSelectors {
    name: SelectorChain(&["span.VU-ZEz", "span.B_NuCI"]),
    price: SelectorChain(&["div._30jeq3"]),
    rating: SelectorChain(&["div._3LWZlK"]),
};

pub struct Flipkart {
    base_url: String,
}

impl Flipkart {
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

impl Default for Flipkart {
    fn default() -> Self {
        Self::new()
    }
}

impl Marketplace for Flipkart {
    fn platform_tag(&self) -> &'static str {
        PLATFORM_TAG
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.base_url, encode_query(query))
    }

    fn parse_listing(&self, markup: &str) -> Vec<RawProduct> {
        parse_listing_with(&LISTING, &self.base_url, PLATFORM_TAG, markup)
    }

    fn parse_product(&self, markup: &str, url: &str) -> Option<RawProduct> {
        parse_product_with(&PRODUCT, PLATFORM_TAG, markup, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID_FIXTURE: &str = r#"
        <html><body>
        <div class="_13oc-S">
            <a class="_1fQZEK" href="/galaxy-m14/p/itm1">link</a>
            <div class="_4rR01T">SAMSUNG Galaxy M14 5G (Icy Silver, 128 GB)</div>
            <div class="_30jeq3">₹13,490</div>
            <div class="_3LWZlK">4.2</div>
        </div>
        <div class="_13oc-S">
            <a class="_1fQZEK" href="/galaxy-m15/p/itm2">link</a>
            <div class="_4rR01T">SAMSUNG Galaxy M15 5G</div>
            <div class="_30jeq3">₹11,999</div>
        </div>
        </body></html>
    "#;

    // Older cohort: row cards named by the previous class generation.
    const ROW_FIXTURE: &str = r#"
        <html><body>
        <div class="_1AtVbE">
            <a class="s1Q9rs" href="/acme-mouse/p/itm3">Acme Mouse</a>
            <div class="_30jeq3">₹599</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn search_url_encodes_the_query() {
        let flipkart = Flipkart::new();
        assert_eq!(
            flipkart.search_url("galaxy m14"),
            "https://www.flipkart.com/search?q=galaxy%20m14"
        );
    }

    #[test]
    fn parse_listing_reads_the_current_grid_layout() {
        let flipkart = Flipkart::new();
        let products = flipkart.parse_listing(GRID_FIXTURE);
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0].name.as_deref(),
            Some("SAMSUNG Galaxy M14 5G (Icy Silver, 128 GB)")
        );
        assert_eq!(products[0].price_text.as_deref(), Some("₹13,490"));
        assert_eq!(products[0].rating_text.as_deref(), Some("4.2"));
        assert_eq!(products[0].url, "https://www.flipkart.com/galaxy-m14/p/itm1");
        assert!(products[1].rating_text.is_none());
    }

    #[test]
    fn parse_listing_falls_back_to_the_row_layout() {
        let flipkart = Flipkart::new();
        let products = flipkart.parse_listing(ROW_FIXTURE);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name.as_deref(), Some("Acme Mouse"));
        assert_eq!(products[0].url, "https://www.flipkart.com/acme-mouse/p/itm3");
    }

    #[test]
    fn parse_listing_with_no_matching_cards_is_empty() {
        let flipkart = Flipkart::new();
        assert!(flipkart
            .parse_listing("<html><body><div>unexpected shape</div></body></html>")
            .is_empty());
    }

    #[test]
    fn parse_product_prefers_the_current_title_class() {
        let markup = r#"
            <html><body>
            <span class="VU-ZEz">SAMSUNG Galaxy M14 5G</span>
            <span class="B_NuCI">stale title variant</span>
            <div class="_30jeq3">₹13,490</div>
            <div class="_3LWZlK">4.2</div>
            </body></html>
        "#;
        let flipkart = Flipkart::new();
        let product = flipkart
            .parse_product(markup, "https://www.flipkart.com/galaxy-m14/p/itm1")
            .expect("expected a product");
        assert_eq!(product.name.as_deref(), Some("SAMSUNG Galaxy M14 5G"));
    }

    #[test]
    fn parse_product_uses_the_legacy_title_class_when_needed() {
        let markup = r#"<span class="B_NuCI">SAMSUNG Galaxy M14 5G</span>"#;
        let flipkart = Flipkart::new();
        let product = flipkart
            .parse_product(markup, "https://www.flipkart.com/galaxy-m14/p/itm1")
            .expect("expected a product");
        assert_eq!(product.name.as_deref(), Some("SAMSUNG Galaxy M14 5G"));
    }

    #[test]
    fn parse_product_without_title_is_none() {
        let flipkart = Flipkart::new();
        assert!(flipkart
            .parse_product("<div>no title here</div>", "https://www.flipkart.com/x")
            .is_none());
    }
}
