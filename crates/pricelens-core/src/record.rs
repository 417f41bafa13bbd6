use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A product listing normalized for comparison across marketplaces.
///
/// Records are created once by the normalization stage and never mutated
/// afterwards. `product_name` and `url` are always non-empty; `price` and
/// `rating` are `None` when the source markup carried no parseable value,
/// which is distinct from a value of zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Canonical display name (lowercased, sanitized, then title-cased).
    pub product_name: String,
    /// Marketplace tag the record was scraped from (e.g., `"Amazon"`).
    pub platform: String,
    /// Price in the marketplace's display currency. `None` when unparsable.
    pub price: Option<f64>,
    /// Customer rating on the marketplace's scale. `None` when unparsable.
    pub rating: Option<f64>,
    /// Absolute URL of the product page.
    pub url: String,
    /// Capture time, fixed at record creation.
    pub timestamp: DateTime<Utc>,
}

impl ProductRecord {
    /// Encodes this record in the ingestion endpoint's wire format.
    ///
    /// The sink expects `price` as a 2-fraction-digit decimal string and
    /// `rating` as a 1-fraction-digit decimal string, with both fields
    /// omitted entirely when absent. The distinction between "absent" and
    /// "0.00" is load-bearing downstream, so absence is never substituted
    /// with zero here.
    #[must_use]
    pub fn to_payload(&self) -> SinkPayload {
        SinkPayload {
            product_name: self.product_name.clone(),
            platform: self.platform.clone(),
            price: self.price.map(|p| format!("{p:.2}")),
            rating: self.rating.map(|r| format!("{r:.1}")),
            url: self.url.clone(),
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Wire representation of one [`ProductRecord`] as POSTed to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkPayload {
    pub product_name: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    pub url: String,
    /// ISO-8601 UTC capture time.
    pub timestamp: String,
}
