//! Catalog normalization + discount-blob parsing for OfferDeck.
//!
//! Two pure leaves live here: [`normalize`] flattens the provider's nested
//! payload into [`OfferView`] records, and [`parse_discounts`] turns a
//! free-text discount blob into structured [`DiscountEntry`] rows. Neither
//! fails: malformed records are skipped, unextractable fields degrade to the
//! `"N/A"` sentinel.

use std::fs;
use std::path::Path;

use offerdeck_core::{
    offer_key, CatalogEnvelope, DiscountEntry, OfferView, RawOfferRecord, ALL_CATEGORIES,
    NOT_AVAILABLE,
};
use thiserror::Error;
use tracing::debug;

pub const CRATE_NAME: &str = "offerdeck-catalog";

/// Marker separating the original from the discounted half of a line.
const ARROW: char = '\u{2192}';
/// A line must also carry this literal to count as a discount line.
const PERCENT_OFF: &str = "% OFF";
/// Price ranges inside the original-price group use an en-dash.
const EN_DASH: char = '\u{2013}';

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading catalog payload {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing catalog payload {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a provider payload from disk and unwrap the envelope.
pub fn load_catalog_fixture(path: impl AsRef<Path>) -> Result<Vec<RawOfferRecord>, CatalogError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let envelope: CatalogEnvelope =
        serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(envelope.data.get_user_discount_codes.data)
}

/// Flatten raw records into view models, preserving input order.
///
/// Records without a `brandproduct` sub-record are skipped; a missing `store`
/// sub-record degrades field-by-field to empty strings.
pub fn normalize(raw: &[RawOfferRecord]) -> Vec<OfferView> {
    raw.iter().filter_map(normalize_record).collect()
}

fn normalize_record(record: &RawOfferRecord) -> Option<OfferView> {
    let Some(product) = &record.brandproduct else {
        debug!("skipping offer record without brandproduct");
        return None;
    };
    let store = record.store.clone().unwrap_or_default();
    let category = match product.tag.as_deref() {
        Some(tag) if !tag.trim().is_empty() => tag.to_string(),
        _ => ALL_CATEGORIES.to_string(),
    };
    Some(OfferView {
        key: offer_key(&store.id, &product.discount_code).to_string(),
        title: product.name.clone(),
        coins: product.customer_cashback,
        category,
        discount_text: product.discount_code.clone(),
        logo_path: store.logo.clone(),
        cashback_percent: product.customer_cashback_percent,
        duration_days: product.discount_duration,
        expiry_timestamp: product.expiry_date.clone(),
        social_links: product.social_media.clone(),
        linked_store_ids: product.linked_stores.iter().map(|s| s.id.clone()).collect(),
        store_name: store.name,
        store_id: store.id,
    })
}

/// Parse a discount blob into structured entries.
///
/// A line qualifies only if it contains both the arrow marker and `"% OFF"`;
/// everything else contributes nothing. Re-invoking on the same text yields an
/// identical sequence.
pub fn parse_discounts(text: &str) -> Vec<DiscountEntry> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.contains(ARROW) && line.contains(PERCENT_OFF))
        .map(parse_discount_line)
        .collect()
}

fn parse_discount_line(line: &str) -> DiscountEntry {
    let mut segments = line.split(ARROW);
    let before = segments.next().unwrap_or("").trim();
    let after = segments.next().unwrap_or("").trim();
    // Anything past a second arrow is dropped, mirroring the upstream
    // two-way split.

    let service = before.split('-').next().unwrap_or(before).trim().to_string();

    let original_price = match first_paren_group(before) {
        Some(group) => group.split(EN_DASH).next().unwrap_or(group).to_string(),
        None => NOT_AVAILABLE.to_string(),
    };

    let discounted_price = first_paren_group(after)
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let discount_percent =
        digits_before_percent(after).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    DiscountEntry {
        service,
        original_price,
        discounted_price,
        discount_percent,
    }
}

/// First non-empty `(...)` group, or `None`.
fn first_paren_group(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let tail = &rest[open + 1..];
        match tail.find(')') {
            // Empty group: keep scanning.
            Some(0) => rest = &tail[1..],
            Some(close) => return Some(&tail[..close]),
            None => return None,
        }
    }
    None
}

/// Digit run immediately preceding the first `%` that has one, or `None`.
fn digits_before_percent(text: &str) -> Option<String> {
    for (idx, ch) in text.char_indices() {
        if ch != '%' {
            continue;
        }
        let prefix = &text[..idx];
        let run_start = prefix
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);
        if let Some(start) = run_start {
            return Some(prefix[start..].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerdeck_core::{RawBrandProduct, RawStore};

    fn product(name: &str, tag: Option<&str>, blob: &str) -> RawBrandProduct {
        RawBrandProduct {
            name: name.to_string(),
            customer_cashback: 50,
            customer_cashback_percent: 5.0,
            discount_duration: 30,
            expiry_date: "1750500000000".to_string(),
            tag: tag.map(str::to_string),
            discount_code: blob.to_string(),
            social_media: vec![],
            linked_stores: vec![],
        }
    }

    fn record(name: &str, tag: Option<&str>) -> RawOfferRecord {
        RawOfferRecord {
            brandproduct: Some(product(name, tag, "code")),
            store: Some(RawStore {
                name: "Store".to_string(),
                id: format!("st-{name}"),
                logo: "/images/store.png".to_string(),
            }),
            discount_code: None,
        }
    }

    #[test]
    fn parses_service_prices_and_percent_from_a_full_line() {
        let entries =
            parse_discounts("Netflix - Premium (\u{20b9}649\u{2013}499) \u{2192} Discounted (\u{20b9}499) 23% OFF");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].service, "Netflix");
        assert_eq!(entries[0].original_price, "\u{20b9}649");
        assert_eq!(entries[0].discounted_price, "\u{20b9}499");
        assert_eq!(entries[0].discount_percent, "23");
    }

    #[test]
    fn line_without_arrow_is_dropped() {
        assert!(parse_discounts("No arrow here 50% OFF").is_empty());
    }

    #[test]
    fn line_without_percent_off_is_dropped() {
        assert!(parse_discounts("Spotify - Duo (\u{20b9}199) \u{2192} (\u{20b9}149)").is_empty());
    }

    #[test]
    fn blank_and_whitespace_lines_contribute_nothing() {
        let blob = "\n   \n\t\nHotstar (\u{20b9}299) \u{2192} (\u{20b9}249) 17% OFF\n\n";
        assert_eq!(parse_discounts(blob).len(), 1);
    }

    #[test]
    fn multi_arrow_line_keeps_first_two_segments() {
        // Content past the second arrow is silently lost; pinned behavior.
        let entries = parse_discounts(
            "Prime - Annual (\u{20b9}1499) \u{2192} (\u{20b9}999) 33% OFF \u{2192} (\u{20b9}499) 66% OFF",
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original_price, "\u{20b9}1499");
        assert_eq!(entries[0].discounted_price, "\u{20b9}999");
        assert_eq!(entries[0].discount_percent, "33");
    }

    #[test]
    fn original_price_without_en_dash_keeps_whole_group() {
        let entries = parse_discounts("Zee5 - HD (\u{20b9}599) \u{2192} (\u{20b9}499) 17% OFF");
        assert_eq!(entries[0].original_price, "\u{20b9}599");
    }

    #[test]
    fn missing_pieces_degrade_per_field() {
        let entries = parse_discounts("SonyLiv \u{2192} better deal % OFF");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].service, "SonyLiv");
        assert_eq!(entries[0].original_price, NOT_AVAILABLE);
        assert_eq!(entries[0].discounted_price, NOT_AVAILABLE);
        assert_eq!(entries[0].discount_percent, NOT_AVAILABLE);
    }

    #[test]
    fn first_digit_bearing_percent_governs() {
        let entries = parse_discounts("Plan \u{2192} (\u{20b9}99) 10% now, was 20% OFF");
        assert_eq!(entries[0].discount_percent, "10");
    }

    #[test]
    fn bare_percent_is_skipped_in_favor_of_a_digit_run() {
        let entries = parse_discounts("Plan \u{2192} save % then (\u{20b9}49) 15% OFF");
        assert_eq!(entries[0].discount_percent, "15");
    }

    #[test]
    fn service_without_hyphen_is_the_whole_before_segment() {
        let entries = parse_discounts("Hotstar Super (\u{20b9}899) \u{2192} (\u{20b9}699) 22% OFF");
        assert_eq!(entries[0].service, "Hotstar Super (\u{20b9}899)");
    }

    #[test]
    fn parsing_is_deterministic() {
        let blob = "A - X (\u{20b9}100\u{2013}80) \u{2192} (\u{20b9}80) 20% OFF\nB \u{2192} 5% OFF";
        assert_eq!(parse_discounts(blob), parse_discounts(blob));
    }

    #[test]
    fn normalize_skips_records_without_brandproduct_and_preserves_order() {
        let raw = vec![
            record("alpha", Some("salaried")),
            RawOfferRecord::default(),
            record("beta", None),
        ];
        let offers = normalize(&raw);
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].title, "alpha");
        assert_eq!(offers[1].title, "beta");
    }

    #[test]
    fn absent_or_blank_tag_defaults_to_all() {
        let raw = vec![record("untagged", None), record("blank", Some("  "))];
        for offer in normalize(&raw) {
            assert_eq!(offer.category, ALL_CATEGORIES);
        }
    }

    #[test]
    fn missing_store_degrades_to_empty_fields() {
        let raw = vec![RawOfferRecord {
            brandproduct: Some(product("solo", Some("travel"), "code")),
            store: None,
            discount_code: None,
        }];
        let offers = normalize(&raw);
        assert_eq!(offers[0].store_name, "");
        assert_eq!(offers[0].store_id, "");
        assert_eq!(offers[0].logo_path, "");
        assert_eq!(offers[0].category, "travel");
    }

    #[test]
    fn offer_keys_are_stable_across_runs() {
        let raw = vec![record("alpha", None)];
        let first = normalize(&raw);
        let second = normalize(&raw);
        assert_eq!(first[0].key, second[0].key);
    }
}
