//! Basic-economy exclusion.
//!
//! Offers without a fare class are kept and annotated, never dropped.

use crate::domain::FareOffer;

/// Case-insensitive substrings that mark a restrictive fare.
///
/// NOTE: the single-letter `"E"` matches any fare class containing an E
/// (`"ECONOMY"`, `"PREMIUM ECONOMY"`, `"BUSINESS"`). Kept as-is; see DESIGN.md.
pub const BASIC_ECONOMY_MARKERS: [&str; 6] =
    ["BASIC", "BASIC ECONOMY", "E", "LIGHT", "NO-FRILLS", "ECONOMY BASIC"];

pub const FARE_CLASS_UNAVAILABLE_NOTE: &str = "Fare class unavailable — may include basic economy.";

pub fn is_basic_economy(fare_class: &str) -> bool {
    let upper = fare_class.to_uppercase();
    BASIC_ECONOMY_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Apply the `exclude_basic_economy` preference to a list of offers.
pub fn apply_fare_filter(offers: Vec<FareOffer>, exclude_basic_economy: bool) -> Vec<FareOffer> {
    if !exclude_basic_economy {
        return offers;
    }

    offers
        .into_iter()
        .filter_map(|mut offer| match offer.fare_class_raw.as_deref() {
            None => {
                offer.fare_class_note = Some(FARE_CLASS_UNAVAILABLE_NOTE.to_string());
                Some(offer)
            }
            Some(class) if is_basic_economy(class) => None,
            Some(_) => Some(offer),
        })
        .collect()
}
