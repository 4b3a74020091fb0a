//! Access to fare pricing.
//!
//! - `PricingApi`: the seam between the aggregation engine and an external fare API
//! - `amadeus`: the HTTP implementation
//! - `mock`: synthetic offers for unauthenticated callers

use chrono::NaiveDate;

use crate::domain::FareOffer;
use crate::error::SearchError;

pub mod amadeus;
pub mod mock;

pub use amadeus::AmadeusClient;
pub use mock::generate_mock_offers;

/// Short-lived bearer token, valid for one search.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Why a single discovery or pricing probe produced nothing.
///
/// The engine skips all of these the same way; the distinction only feeds logs
/// and run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// No flight (or none within budget) for that sample.
    NotFound,
    /// Upstream asked us to slow down.
    RateLimited,
    /// 5xx, timeout, transport or decode failure.
    TransientError,
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProbeOutcome::NotFound => "not found",
            ProbeOutcome::RateLimited => "rate limited",
            ProbeOutcome::TransientError => "transient error",
        };
        f.write_str(label)
    }
}

/// Raw discovery entry: a destination reachable within budget on the probed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDestination {
    pub code: String,
    pub name: Option<String>,
}

/// Operations the aggregation engine needs from a fare API.
///
/// Implementations must not retry internally; the engine's date sampling
/// provides the redundancy.
pub trait PricingApi: Send + Sync {
    /// Exchange configured credentials for a bearer token.
    fn authenticate(&self) -> Result<AccessToken, SearchError>;

    /// Destinations reachable from `origin` within `max_budget` departing on `date`.
    ///
    /// Zero results is `Ok(vec![])`, not an error.
    fn discover_destinations(
        &self,
        token: &AccessToken,
        origin: &str,
        max_budget: f64,
        date: NaiveDate,
    ) -> Result<Vec<DiscoveredDestination>, ProbeOutcome>;

    /// Cheapest offer not exceeding `max_budget` for one (destination, date) pair.
    fn price_offer(
        &self,
        token: &AccessToken,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        max_budget: f64,
    ) -> Result<FareOffer, ProbeOutcome>;
}
