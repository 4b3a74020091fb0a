//! Request/offer types shared by the search pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Upper bound accepted for `max_budget`.
pub const MAX_BUDGET: f64 = 100_000.0;
/// Shortest search window, in months.
pub const MIN_MONTHS_AHEAD: u32 = 1;
/// Longest search window, in months.
pub const MAX_MONTHS_AHEAD: u32 = 6;

/// Untrusted search parameters as they arrive from a caller.
///
/// Nothing here has been checked yet; convert with `SearchRequest::try_from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub origin: String,
    pub max_budget: f64,
    pub months_ahead: i64,
    #[serde(default)]
    pub exclude_basic_economy: bool,
}

/// A validated flight search.
///
/// Fields are private so a `SearchRequest` can only exist in a valid state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    origin: String,
    max_budget: f64,
    months_ahead: u32,
    exclude_basic_economy: bool,
}

impl SearchRequest {
    pub fn new(
        origin: &str,
        max_budget: f64,
        months_ahead: i64,
        exclude_basic_economy: bool,
    ) -> Result<Self, SearchError> {
        let origin = origin.trim().to_ascii_uppercase();
        if origin.is_empty() {
            return Err(SearchError::Validation("Origin is required.".to_string()));
        }
        if !is_iata_code(&origin) {
            return Err(SearchError::Validation(format!(
                "Origin '{origin}' is not a three-letter IATA airport code."
            )));
        }
        if !(max_budget.is_finite() && max_budget > 0.0 && max_budget <= MAX_BUDGET) {
            return Err(SearchError::Validation(format!(
                "Budget must be greater than 0 and at most {MAX_BUDGET:.0}."
            )));
        }
        if months_ahead < i64::from(MIN_MONTHS_AHEAD) || months_ahead > i64::from(MAX_MONTHS_AHEAD) {
            return Err(SearchError::Validation(format!(
                "Months ahead must be between {MIN_MONTHS_AHEAD} and {MAX_MONTHS_AHEAD}."
            )));
        }

        Ok(Self {
            origin,
            max_budget,
            months_ahead: months_ahead as u32,
            exclude_basic_economy,
        })
    }

    /// Uppercased IATA code of the departure airport.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn max_budget(&self) -> f64 {
        self.max_budget
    }

    pub fn months_ahead(&self) -> u32 {
        self.months_ahead
    }

    pub fn exclude_basic_economy(&self) -> bool {
        self.exclude_basic_economy
    }
}

impl TryFrom<SearchInput> for SearchRequest {
    type Error = SearchError;

    fn try_from(input: SearchInput) -> Result<Self, Self::Error> {
        SearchRequest::new(
            &input.origin,
            input.max_budget,
            input.months_ahead,
            input.exclude_basic_economy,
        )
    }
}

/// Where an offer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSource {
    /// Priced by the external fare API.
    Live,
    /// Synthesized locally; not bookable at the shown price.
    Mock,
}

/// The cheapest fare found for one destination on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareOffer {
    pub destination_code: String,
    pub destination_name: String,
    pub price: f64,
    pub currency: String,
    pub departure_date: NaiveDate,
    pub airline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare_class_raw: Option<String>,
    /// Third-party URL where the fare can be searched/booked.
    pub booking_reference: String,
    pub source: OfferSource,
    /// Set by the fare filter when the fare class could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare_class_note: Option<String>,
}

/// A destination seen during discovery, scored by how often it showed up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationCandidate {
    pub code: String,
    pub name: Option<String>,
    /// Number of distinct key dates on which the destination was reachable within budget.
    pub appearance_count: usize,
}

/// Three ASCII letters.
pub fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}
