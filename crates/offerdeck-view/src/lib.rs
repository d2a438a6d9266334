//! Offer board state for OfferDeck: active filter category, at most one
//! expanded offer, and the derivations the presentation layer consumes.
//!
//! The board is a plain owned value with explicit mutators; embed it behind a
//! single writer (a mutex in the web layer) when shared. Every time-based
//! computation takes the reference instant as a parameter.

use chrono::{DateTime, Utc};
use offerdeck_catalog::parse_discounts;
use offerdeck_core::{DiscountEntry, OfferView, ALL_CATEGORIES};
use serde::Serialize;
use tracing::debug;

pub const CRATE_NAME: &str = "offerdeck-view";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Countdown label for offers past their expiry instant.
pub const EXPIRED: &str = "Expired";

#[derive(Debug, Clone)]
pub struct OfferBoard {
    active_category: String,
    expanded_key: Option<String>,
    offers: Vec<OfferView>,
}

impl OfferBoard {
    pub fn new() -> Self {
        Self {
            active_category: ALL_CATEGORIES.to_string(),
            expanded_key: None,
            offers: Vec::new(),
        }
    }

    /// Replace the offer list wholesale. An expanded key that no longer
    /// resolves is cleared.
    pub fn load(&mut self, offers: Vec<OfferView>) {
        debug!(count = offers.len(), "offer catalog loaded");
        self.offers = offers;
        if let Some(key) = &self.expanded_key {
            if !self.offers.iter().any(|o| &o.key == key) {
                self.expanded_key = None;
            }
        }
    }

    pub fn offers(&self) -> &[OfferView] {
        &self.offers
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn expanded_key(&self) -> Option<&str> {
        self.expanded_key.as_deref()
    }

    /// No validation against known categories; an unknown category simply
    /// yields an empty visible set.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.active_category = category.into();
    }

    /// Expand `key`, collapsing whatever was expanded before; toggling the
    /// expanded key collapses it.
    pub fn toggle_details(&mut self, key: &str) {
        if self.expanded_key.as_deref() == Some(key) {
            self.expanded_key = None;
        } else {
            self.expanded_key = Some(key.to_string());
        }
    }

    /// Offers matching the active category, in catalog order. The
    /// [`ALL_CATEGORIES`] sentinel matches everything.
    pub fn visible_offers(&self) -> Vec<&OfferView> {
        self.offers
            .iter()
            .filter(|o| o.category == self.active_category || self.active_category == ALL_CATEGORIES)
            .collect()
    }

    pub fn expanded_offer(&self) -> Option<&OfferView> {
        let key = self.expanded_key.as_deref()?;
        self.offers.iter().find(|o| o.key == key)
    }

    /// Detail view for the expanded offer: the discount blob re-parsed fresh
    /// plus the countdown against `now`.
    pub fn expanded_details(&self, now: DateTime<Utc>) -> Option<OfferDetail> {
        self.expanded_offer()
            .map(|offer| OfferDetail::for_offer(offer, now))
    }
}

impl Default for OfferBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the detail panel shows for one offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDetail {
    pub offer: OfferView,
    pub discounts: Vec<DiscountEntry>,
    pub expiry: String,
}

impl OfferDetail {
    pub fn for_offer(offer: &OfferView, now: DateTime<Utc>) -> Self {
        Self {
            offer: offer.clone(),
            discounts: parse_discounts(&offer.discount_text),
            expiry: days_remaining(&offer.expiry_timestamp, now),
        }
    }
}

/// Countdown label for a millisecond-epoch expiry timestamp.
///
/// Ceil of the day difference; strictly positive renders `"<N> days left"`,
/// anything else (including an unparseable timestamp) renders [`EXPIRED`].
pub fn days_remaining(expiry_ms: &str, now: DateTime<Utc>) -> String {
    let Ok(expiry) = expiry_ms.trim().parse::<i64>() else {
        return EXPIRED.to_string();
    };
    let diff_ms = expiry - now.timestamp_millis();
    let diff_days = (diff_ms as f64 / MILLIS_PER_DAY).ceil() as i64;
    if diff_days > 0 {
        format!("{diff_days} days left")
    } else {
        EXPIRED.to_string()
    }
}
