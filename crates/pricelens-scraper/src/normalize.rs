//! Normalization from raw extracted text to canonical records.
//!
//! All functions here are pure and never fail: absence is the failure
//! mode. Unparsable price or rating text becomes `None`, which is a
//! distinct state from zero; substituting zero is a sink-compatibility
//! concern and must happen explicitly at that boundary, never here.

use chrono::Utc;
use pricelens_core::ProductRecord;
use regex::Regex;

use crate::types::RawProduct;

/// Canonicalizes a display name: lowercase, strip everything but
/// letters, digits and `+`, collapse whitespace, then title-case.
///
/// Idempotent: applying it to its own output is a no-op.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let sanitizer = Regex::new(r"[^a-z0-9+]+").expect("valid regex");
    let cleaned = sanitizer.replace_all(&lower, " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Extracts a price from marketplace display text, e.g. `"₹1,09,900"`.
///
/// Takes the first contiguous `[digits , .]` run, strips `,` as a
/// grouping separator, and parses the rest with `.` as the decimal
/// point. Known limitation: without a locale hint this misreads
/// European decimal commas (`"1.234,56"`); lakh grouping and US formats
/// come out right. Returns `None` when no digit run parses.
#[must_use]
pub fn normalize_price(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('\u{a0}', " ");
    let matcher = Regex::new(r"[\d,.]+").expect("valid regex");
    let run = matcher.find(&cleaned)?.as_str().replace(',', "");
    run.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Extracts the first decimal-number-shaped substring from rating text,
/// e.g. `"4.5 out of 5 stars"` → `4.5`. Returns `None` when none found.
#[must_use]
pub fn normalize_rating(raw: &str) -> Option<f64> {
    let matcher = Regex::new(r"\d+(?:\.\d+)?").expect("valid regex");
    let found = matcher.find(raw)?;
    found.as_str().parse::<f64>().ok()
}

/// Builds a canonical record from a raw field set, stamping the current
/// UTC time. Returns `None` when the raw product has no usable name;
/// records without a name must not exist.
#[must_use]
pub fn build_record(raw: &RawProduct) -> Option<ProductRecord> {
    let name = raw.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let product_name = normalize_name(name);
    if product_name.is_empty() {
        return None;
    }

    Some(ProductRecord {
        product_name,
        platform: raw.platform.to_string(),
        price: raw.price_text.as_deref().and_then(normalize_price),
        rating: raw.rating_text.as_deref().and_then(normalize_rating),
        url: raw.url.clone(),
        timestamp: Utc::now(),
    })
}

/// Uppercases every alphabetic character that follows a non-alphabetic
/// one (or starts the string). Input is already lowercase.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() && !prev_is_alpha {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_alpha = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // normalize_name
    // -----------------------------------------------------------------------

    #[test]
    fn name_is_title_cased_and_sanitized() {
        assert_eq!(
            normalize_name("SAMSUNG Galaxy M14 5G (Icy Silver, 128 GB)"),
            "Samsung Galaxy M14 5G Icy Silver 128 Gb"
        );
    }

    #[test]
    fn name_keeps_plus_signs() {
        assert_eq!(normalize_name("iPhone 15+ case"), "Iphone 15+ Case");
    }

    #[test]
    fn name_collapses_whitespace_runs() {
        assert_eq!(normalize_name("  acme   wireless \t mouse "), "Acme Wireless Mouse");
    }

    #[test]
    fn name_normalization_is_idempotent() {
        let inputs = [
            "SAMSUNG Galaxy M14 5G (Icy Silver, 128 GB)",
            "Acme Wireless Mouse ~ 2.4GHz",
            "usb+c 65W charger!!",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn name_of_only_stripped_characters_is_empty() {
        assert_eq!(normalize_name("!!! ---"), "");
    }

    // -----------------------------------------------------------------------
    // normalize_price
    // -----------------------------------------------------------------------

    #[test]
    fn price_parses_lakh_grouping() {
        assert_eq!(normalize_price("₹1,09,900"), Some(109_900.0));
    }

    #[test]
    fn price_parses_plain_decimal() {
        assert_eq!(normalize_price("$1,299.50"), Some(1299.5));
    }

    #[test]
    fn price_handles_non_breaking_spaces() {
        assert_eq!(normalize_price("₹\u{a0}13,490"), Some(13_490.0));
    }

    #[test]
    fn price_empty_input_is_absent() {
        assert_eq!(normalize_price(""), None);
    }

    #[test]
    fn price_without_digits_is_absent() {
        assert_eq!(normalize_price("Currently unavailable"), None);
    }

    #[test]
    fn price_unparsable_digit_run_is_absent() {
        // Two decimal points survive the comma strip and fail the parse.
        assert_eq!(normalize_price("1.2.3"), None);
    }

    #[test]
    fn price_is_never_negative() {
        // The digit-run matcher cannot capture a sign.
        assert_eq!(normalize_price("-500"), Some(500.0));
    }

    // -----------------------------------------------------------------------
    // normalize_rating
    // -----------------------------------------------------------------------

    #[test]
    fn rating_extracts_from_star_phrase() {
        assert_eq!(normalize_rating("4.5 out of 5 stars"), Some(4.5));
    }

    #[test]
    fn rating_extracts_bare_number() {
        assert_eq!(normalize_rating("4"), Some(4.0));
    }

    #[test]
    fn rating_without_number_is_absent() {
        assert_eq!(normalize_rating("no rating"), None);
    }

    // -----------------------------------------------------------------------
    // build_record
    // -----------------------------------------------------------------------

    fn raw(name: Option<&str>) -> RawProduct {
        RawProduct {
            name: name.map(str::to_string),
            price_text: Some("₹1,299".to_string()),
            rating_text: Some("4.3 out of 5 stars".to_string()),
            url: "https://www.amazon.in/dp/B0TEST".to_string(),
            platform: "Amazon",
        }
    }

    #[test]
    fn build_record_normalizes_all_fields() {
        let record = build_record(&raw(Some("Acme Wireless Mouse"))).expect("expected a record");
        assert_eq!(record.product_name, "Acme Wireless Mouse");
        assert_eq!(record.platform, "Amazon");
        assert_eq!(record.price, Some(1299.0));
        assert_eq!(record.rating, Some(4.3));
        assert_eq!(record.url, "https://www.amazon.in/dp/B0TEST");
    }

    #[test]
    fn build_record_missing_name_yields_no_record() {
        assert!(build_record(&raw(None)).is_none());
    }

    #[test]
    fn build_record_blank_name_yields_no_record() {
        assert!(build_record(&raw(Some("   "))).is_none());
    }

    #[test]
    fn build_record_name_of_only_symbols_yields_no_record() {
        assert!(build_record(&raw(Some("???"))).is_none());
    }

    #[test]
    fn build_record_keeps_absence_distinct_from_zero() {
        let mut input = raw(Some("Acme Mouse"));
        input.price_text = Some("out of stock".to_string());
        input.rating_text = None;
        let record = build_record(&input).expect("expected a record");
        assert_eq!(record.price, None, "unparsable price must stay absent");
        assert_eq!(record.rating, None);
    }
}
