//! Synthetic offers for callers without live pricing.
//!
//! The shape is fixed (one candidate per table row, capped and sorted); the
//! values are random. The RNG is a parameter so tests can seed it.

use chrono::{Duration, Months, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Uniform};

use crate::booking::BookingLinks;
use crate::domain::{FareOffer, OfferSource, SearchRequest};

pub const MAX_MOCK_RESULTS: usize = 30;
/// Mock departures start a week out.
const FIRST_DEPARTURE_OFFSET_DAYS: i64 = 7;
/// Probability of drawing a fare class from the full roster instead of plain economy.
const NON_DEFAULT_CLASS_PROB: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct MockDestination {
    pub code: &'static str,
    pub name: &'static str,
    /// Typical price as a fraction of the caller's budget.
    pub base_fraction: f64,
    /// Symmetric relative spread around the typical price.
    pub variation: f64,
}

const fn dest(code: &'static str, name: &'static str, base_fraction: f64, variation: f64) -> MockDestination {
    MockDestination {
        code,
        name,
        base_fraction,
        variation,
    }
}

pub const MOCK_DESTINATIONS: [MockDestination; 24] = [
    // Domestic
    dest("LAX", "Los Angeles", 0.4, 0.2),
    dest("JFK", "New York", 0.5, 0.25),
    dest("SFO", "San Francisco", 0.45, 0.2),
    dest("MIA", "Miami", 0.35, 0.3),
    dest("LAS", "Las Vegas", 0.3, 0.25),
    dest("SEA", "Seattle", 0.4, 0.2),
    dest("ORD", "Chicago", 0.35, 0.25),
    dest("DFW", "Dallas", 0.3, 0.2),
    dest("ATL", "Atlanta", 0.35, 0.25),
    dest("PHX", "Phoenix", 0.3, 0.2),
    dest("BOS", "Boston", 0.45, 0.25),
    dest("MCO", "Orlando", 0.35, 0.3),
    // International
    dest("MEX", "Mexico City", 0.4, 0.3),
    dest("CUN", "Cancún", 0.35, 0.3),
    dest("YYZ", "Toronto", 0.4, 0.25),
    dest("YVR", "Vancouver", 0.45, 0.25),
    dest("LHR", "London", 0.7, 0.2),
    dest("CDG", "Paris", 0.75, 0.2),
    dest("FRA", "Frankfurt", 0.7, 0.2),
    dest("MAD", "Madrid", 0.65, 0.25),
    dest("BCN", "Barcelona", 0.65, 0.25),
    dest("AMS", "Amsterdam", 0.7, 0.2),
    dest("FCO", "Rome", 0.7, 0.25),
    dest("IST", "Istanbul", 0.6, 0.3),
];

pub const MOCK_AIRLINES: [&str; 8] = [
    "United Airlines",
    "American Airlines",
    "Delta Air Lines",
    "Southwest Airlines",
    "JetBlue Airways",
    "Alaska Airlines",
    "Frontier Airlines",
    "Spirit Airlines",
];

pub const MOCK_FARE_CLASSES: [&str; 3] = ["ECONOMY", "PREMIUM ECONOMY", "BUSINESS"];

/// Generate up to `MAX_MOCK_RESULTS` offers sorted by ascending price.
pub fn generate_mock_offers<R: Rng + ?Sized>(
    request: &SearchRequest,
    today: NaiveDate,
    links: &BookingLinks,
    rng: &mut R,
) -> Vec<FareOffer> {
    let budget = request.max_budget();
    let noise = Uniform::new_inclusive(-1.0_f64, 1.0_f64);

    let first = today + Duration::days(FIRST_DEPARTURE_OFFSET_DAYS);
    let last = today
        .checked_add_months(Months::new(request.months_ahead()))
        .unwrap_or(first)
        .max(first);
    let span_days = (last - first).num_days();

    let mut offers = Vec::with_capacity(MOCK_DESTINATIONS.len());
    for d in MOCK_DESTINATIONS.iter().filter(|d| d.code != request.origin()) {
        let base = budget * d.base_fraction;
        let price = (base + noise.sample(rng) * base * d.variation).round();
        if !(price > 0.0 && price <= budget) {
            continue;
        }

        let departure_date = first + Duration::days(rng.gen_range(0..=span_days));
        let airline = MOCK_AIRLINES.choose(rng).copied().unwrap_or(MOCK_AIRLINES[0]);
        let fare_class = if rng.gen_bool(NON_DEFAULT_CLASS_PROB) {
            MOCK_FARE_CLASSES.choose(rng).copied().unwrap_or(MOCK_FARE_CLASSES[0])
        } else {
            MOCK_FARE_CLASSES[0]
        };

        offers.push(FareOffer {
            destination_code: d.code.to_string(),
            destination_name: d.name.to_string(),
            price,
            currency: "USD".to_string(),
            departure_date,
            airline: airline.to_string(),
            fare_class_raw: Some(fare_class.to_string()),
            booking_reference: links.link_for(request.origin(), d.code, departure_date),
            source: OfferSource::Mock,
            fare_class_note: None,
        });
    }

    offers.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
    offers.truncate(MAX_MOCK_RESULTS);
    offers
}
