/// Untyped field set extracted straight from marketplace markup.
///
/// Everything except `url` and `platform` is free text exactly as it
/// appeared in the page. Produced per parse call and consumed immediately
/// by normalization; never persisted. A raw product without a name is
/// dropped before it can become a [`pricelens_core::ProductRecord`].
#[derive(Debug, Clone)]
pub struct RawProduct {
    pub name: Option<String>,
    pub price_text: Option<String>,
    pub rating_text: Option<String>,
    /// Absolute URL of the product page.
    pub url: String,
    /// Tag of the marketplace the fields came from.
    pub platform: &'static str,
}
