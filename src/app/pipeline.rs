//! Shared search pipeline: settings -> endpoint -> optional sign-in -> search.
//!
//! Kept apart from `app` so printing and exporting stay out of the workflow.

use serde::Serialize;

use crate::app::SearchConfig;
use crate::auth::{InMemoryUserStore, UserStore};
use crate::config::Settings;
use crate::domain::SearchInput;
use crate::endpoint::{SearchEndpoint, SearchResponse};
use crate::error::AppError;
use crate::pricing::PricingApi;

/// All outputs of a single `fares search` run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRun {
    pub input: SearchInput,
    pub signed_in_as: Option<String>,
    pub response: SearchResponse,
}

/// Run one search against the configured live pricing API.
pub fn run_search(config: &SearchConfig) -> Result<SearchRun, AppError> {
    let settings = Settings::from_env()?;
    let endpoint = SearchEndpoint::from_settings(&settings, InMemoryUserStore::new())?;
    run_search_with(config, &endpoint)
}

/// Run one search through an already wired endpoint.
pub fn run_search_with<P: PricingApi, S: UserStore>(
    config: &SearchConfig,
    endpoint: &SearchEndpoint<P, S>,
) -> Result<SearchRun, AppError> {
    let session = config
        .email
        .as_deref()
        .map(|email| endpoint.users().login_or_register(email))
        .transpose()
        .map_err(|e| AppError::new(2, format!("Sign-in failed: {e}")))?;

    let input = SearchInput {
        origin: config.origin.clone(),
        max_budget: config.max_budget,
        months_ahead: config.months_ahead,
        exclude_basic_economy: config.exclude_basic_economy,
    };
    let response = endpoint.handle(input.clone(), session.as_ref().map(|s| s.token.as_str()))?;

    Ok(SearchRun {
        input,
        signed_in_as: session.map(|s| s.user.email),
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::booking::BookingLinks;
    use crate::domain::{FareOffer, OfferSource};
    use crate::error::SearchError;
    use crate::pricing::{AccessToken, DiscoveredDestination, ProbeOutcome};
    use crate::search::AggregationEngine;

    struct RejectingPricing;

    impl PricingApi for RejectingPricing {
        fn authenticate(&self) -> Result<AccessToken, SearchError> {
            Err(SearchError::Auth("invalid_client".into()))
        }

        fn discover_destinations(
            &self,
            _: &AccessToken,
            _: &str,
            _: f64,
            _: NaiveDate,
        ) -> Result<Vec<DiscoveredDestination>, ProbeOutcome> {
            Err(ProbeOutcome::TransientError)
        }

        fn price_offer(&self, _: &AccessToken, _: &str, _: &str, _: NaiveDate, _: f64) -> Result<FareOffer, ProbeOutcome> {
            Err(ProbeOutcome::TransientError)
        }
    }

    fn endpoint() -> SearchEndpoint<RejectingPricing, InMemoryUserStore> {
        SearchEndpoint::new(
            AggregationEngine::new(RejectingPricing),
            InMemoryUserStore::new(),
            BookingLinks::default(),
        )
    }

    fn config(email: Option<&str>) -> SearchConfig {
        SearchConfig {
            origin: "lax".to_string(),
            max_budget: 900.0,
            months_ahead: 2,
            exclude_basic_economy: false,
            email: email.map(str::to_string),
            top_n: 10,
            json: false,
            export: None,
        }
    }

    #[test]
    fn anonymous_search_is_served_by_mock() {
        let run = run_search_with(&config(None), &endpoint()).unwrap();
        assert_eq!(run.response.source, OfferSource::Mock);
        assert!(run.signed_in_as.is_none());
        assert!(run.response.results.iter().all(|o| o.destination_code != "LAX"));
    }

    #[test]
    fn signed_in_search_surfaces_auth_failure_as_exit_3() {
        let err = run_search_with(&config(Some("Pat@Example.com")), &endpoint()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("AUTHENTICATION_FAILED"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let err = run_search_with(&config(Some("not-an-email")), &endpoint()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
