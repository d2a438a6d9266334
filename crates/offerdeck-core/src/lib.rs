//! Core domain model for OfferDeck: raw provider payload shapes and the
//! flattened view types derived from them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CRATE_NAME: &str = "offerdeck-core";

/// Universal-match filter sentinel; also the default category for untagged offers.
pub const ALL_CATEGORIES: &str = "all";

/// Per-field fallback for anything the discount parser cannot extract.
pub const NOT_AVAILABLE: &str = "N/A";

/// One social-media contact attached to a brand product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SocialLink {
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "icon")]
    pub icon_hint: String,
    #[serde(default)]
    pub description: String,
}

/// Reference to another store carrying the same brand product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LinkedStoreRef {
    #[serde(default, rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub businesstype: Option<String>,
}

/// Provider wire envelope: `data.getUserDiscountCodes.data` holds the records.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEnvelope {
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeData {
    #[serde(rename = "getUserDiscountCodes")]
    pub get_user_discount_codes: DiscountCodePage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountCodePage {
    #[serde(default)]
    pub data: Vec<RawOfferRecord>,
}

/// One raw record as delivered by the provider. Every nested field is optional
/// or defaulted so a structurally valid payload never fails to deserialize.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawOfferRecord {
    #[serde(default)]
    pub brandproduct: Option<RawBrandProduct>,
    #[serde(default)]
    pub store: Option<RawStore>,
    #[serde(default, rename = "discountCode")]
    pub discount_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawBrandProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub customer_cashback: i64,
    #[serde(default)]
    pub customer_cashback_percent: f64,
    #[serde(default, rename = "discountDuration")]
    pub discount_duration: i64,
    /// Milliseconds since epoch, as a numeric string.
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub tag: Option<String>,
    /// Free-text discount blob; see the discount line parser.
    #[serde(default, rename = "discountCode")]
    pub discount_code: String,
    #[serde(default, rename = "socialMedia")]
    pub social_media: Vec<SocialLink>,
    #[serde(default, rename = "linkedStores")]
    pub linked_stores: Vec<LinkedStoreRef>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStore {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub logo: String,
}

/// Flat per-offer view model. Built once per payload and replaced wholesale on
/// refresh; `discount_text` is re-parsed on every detail view, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferView {
    /// Stable identity for expand/collapse; display titles may collide.
    pub key: String,
    pub title: String,
    pub coins: i64,
    /// Never empty; absent or blank tags map to [`ALL_CATEGORIES`].
    pub category: String,
    pub discount_text: String,
    pub logo_path: String,
    pub cashback_percent: f64,
    pub duration_days: i64,
    pub expiry_timestamp: String,
    pub social_links: Vec<SocialLink>,
    pub linked_store_ids: Vec<String>,
    pub store_name: String,
    pub store_id: String,
}

/// One structured discount line extracted from a blob. Fields degrade to
/// [`NOT_AVAILABLE`] independently when the line does not yield them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountEntry {
    pub service: String,
    pub original_price: String,
    pub discounted_price: String,
    pub discount_percent: String,
}

/// Deterministic offer identity over the store id and the discount blob.
pub fn offer_key(store_id: &str, discount_text: &str) -> Uuid {
    let source = format!("{store_id}:{discount_text}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, source.as_bytes())
}
