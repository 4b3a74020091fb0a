//! Search entry point: input validation, mock-vs-live routing, response shaping.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::UserStore;
use crate::booking::BookingLinks;
use crate::config::Settings;
use crate::domain::{FareOffer, OfferSource, SearchInput, SearchRequest};
use crate::error::SearchError;
use crate::pricing::{AmadeusClient, PricingApi, generate_mock_offers};
use crate::search::{AggregationEngine, SearchControl};

pub const NO_RESULTS_MESSAGE: &str = "No flights found — try adjusting your budget or dates.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<FareOffer>,
    pub count: usize,
    pub source: OfferSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchResponse {
    fn new(results: Vec<FareOffer>, source: OfferSource) -> Self {
        let message = results.is_empty().then(|| NO_RESULTS_MESSAGE.to_string());
        Self {
            count: results.len(),
            results,
            source,
            message,
        }
    }
}

pub struct SearchEndpoint<P, S> {
    engine: AggregationEngine<P>,
    users: S,
    links: BookingLinks,
    search_deadline: Duration,
    mock_fallback: bool,
}

impl<S: UserStore> SearchEndpoint<AmadeusClient, S> {
    /// Wire up the live client and engine from settings.
    pub fn from_settings(settings: &Settings, users: S) -> Result<Self, SearchError> {
        let links = BookingLinks::new(&settings.affiliate);
        let client = AmadeusClient::new(&settings.pricing, links.clone())?;
        let engine = AggregationEngine::new(client).with_max_concurrency(settings.max_concurrency);
        Ok(SearchEndpoint::new(engine, users, links)
            .with_deadline(settings.search_deadline)
            .with_mock_fallback(settings.mock_fallback))
    }
}

impl<P: PricingApi, S: UserStore> SearchEndpoint<P, S> {
    pub fn new(engine: AggregationEngine<P>, users: S, links: BookingLinks) -> Self {
        Self {
            engine,
            users,
            links,
            search_deadline: Duration::from_secs(90),
            mock_fallback: true,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.search_deadline = deadline;
        self
    }

    pub fn with_mock_fallback(mut self, enabled: bool) -> Self {
        self.mock_fallback = enabled;
        self
    }

    pub fn users(&self) -> &S {
        &self.users
    }

    /// Fresh control carrying this endpoint's search deadline.
    ///
    /// Keep its `cancel_handle()` to abort the search from another thread.
    pub fn control(&self) -> SearchControl {
        SearchControl::with_deadline(self.search_deadline)
    }

    pub fn handle(&self, input: SearchInput, token: Option<&str>) -> Result<SearchResponse, SearchError> {
        self.handle_on(input, token, Local::now().date_naive(), &mut rand::thread_rng(), &self.control())
    }

    /// Handle one search relative to `today`.
    ///
    /// Signed-in callers get live fares; anyone else gets mock offers. A live
    /// search that fails with an upstream error falls back to mock offers when
    /// enabled. Configuration and authentication failures always propagate.
    /// Live probes stop once `control` is cancelled or its deadline passes.
    pub fn handle_on<R: Rng + ?Sized>(
        &self,
        input: SearchInput,
        token: Option<&str>,
        today: NaiveDate,
        rng: &mut R,
        control: &SearchControl,
    ) -> Result<SearchResponse, SearchError> {
        let request = SearchRequest::try_from(input)?;

        if !self.users.is_authenticated(token) {
            info!(origin = request.origin(), "unauthenticated caller; serving mock offers");
            return Ok(self.mock_response(&request, today, rng));
        }

        match self.engine.run(&request, today, control) {
            Ok(outcome) => Ok(SearchResponse::new(outcome.offers, OfferSource::Live)),
            Err(err @ SearchError::Upstream(_)) if self.mock_fallback => {
                warn!(code = err.code(), error = %err, "live search failed; serving mock offers");
                Ok(self.mock_response(&request, today, rng))
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "live search failed");
                Err(err)
            }
        }
    }

    // Mock fare classes are synthetic, so the basic-economy filter is not
    // applied; its "E" marker would also remove every generated class.
    fn mock_response<R: Rng + ?Sized>(&self, request: &SearchRequest, today: NaiveDate, rng: &mut R) -> SearchResponse {
        SearchResponse::new(generate_mock_offers(request, today, &self.links, rng), OfferSource::Mock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::auth::InMemoryUserStore;
    use crate::pricing::{AccessToken, DiscoveredDestination, ProbeOutcome};

    struct StubPricing {
        auth: Result<(), SearchError>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl StubPricing {
        fn new(auth: Result<(), SearchError>) -> Self {
            Self {
                auth,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PricingApi for StubPricing {
        fn authenticate(&self) -> Result<AccessToken, SearchError> {
            self.calls.lock().unwrap().push("authenticate");
            self.auth.clone().map(|_| AccessToken::new("t"))
        }

        fn discover_destinations(
            &self,
            _token: &AccessToken,
            _origin: &str,
            _max_budget: f64,
            _date: NaiveDate,
        ) -> Result<Vec<DiscoveredDestination>, ProbeOutcome> {
            self.calls.lock().unwrap().push("discover");
            Ok(vec![DiscoveredDestination {
                code: "DEN".to_string(),
                name: Some("DENVER".to_string()),
            }])
        }

        fn price_offer(
            &self,
            _token: &AccessToken,
            origin: &str,
            destination: &str,
            date: NaiveDate,
            max_budget: f64,
        ) -> Result<FareOffer, ProbeOutcome> {
            self.calls.lock().unwrap().push("price");
            if max_budget < 100.0 {
                return Err(ProbeOutcome::NotFound);
            }
            Ok(FareOffer {
                destination_code: destination.to_string(),
                destination_name: destination.to_string(),
                price: 99.0,
                currency: "USD".to_string(),
                departure_date: date,
                airline: "F9".to_string(),
                fare_class_raw: Some("FIRST".to_string()),
                booking_reference: BookingLinks::default().link_for(origin, destination, date),
                source: OfferSource::Live,
                fare_class_note: None,
            })
        }
    }

    fn endpoint(auth: Result<(), SearchError>) -> SearchEndpoint<StubPricing, InMemoryUserStore> {
        SearchEndpoint::new(
            AggregationEngine::new(StubPricing::new(auth)),
            InMemoryUserStore::new(),
            BookingLinks::default(),
        )
    }

    fn input(origin: &str, budget: f64, months: i64) -> SearchInput {
        SearchInput {
            origin: origin.to_string(),
            max_budget: budget,
            months_ahead: months,
            exclude_basic_economy: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn signed_in<P: PricingApi>(ep: &SearchEndpoint<P, InMemoryUserStore>) -> String {
        ep.users().login_or_register("traveler@example.com").unwrap().token
    }

    #[test]
    fn anonymous_callers_get_mock_offers() {
        let ep = endpoint(Ok(()));
        let mut rng = StdRng::seed_from_u64(7);
        let resp = ep.handle_on(input(" jfk ", 800.0, 2), None, today(), &mut rng, &ep.control()).unwrap();

        assert_eq!(resp.source, OfferSource::Mock);
        assert_eq!(resp.count, resp.results.len());
        assert!(resp.results.iter().all(|o| o.source == OfferSource::Mock && o.price <= 800.0));
        assert!(ep.engine.api().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn signed_in_callers_get_live_offers() {
        let ep = endpoint(Ok(()));
        let token = signed_in(&ep);
        let mut rng = StdRng::seed_from_u64(7);
        let resp = ep.handle_on(input("JFK", 500.0, 1), Some(&token), today(), &mut rng, &ep.control()).unwrap();

        assert_eq!(resp.source, OfferSource::Live);
        assert_eq!(resp.count, 1);
        assert_eq!(resp.results[0].destination_code, "DEN");
        assert_eq!(resp.results[0].destination_name, "DENVER");
        assert!(resp.message.is_none());
    }

    #[test]
    fn unknown_token_is_treated_as_anonymous() {
        let ep = endpoint(Ok(()));
        let mut rng = StdRng::seed_from_u64(1);
        let resp = ep.handle_on(input("JFK", 500.0, 1), Some("stale"), today(), &mut rng, &ep.control()).unwrap();
        assert_eq!(resp.source, OfferSource::Mock);
    }

    #[test]
    fn invalid_input_is_rejected_before_any_probe() {
        let ep = endpoint(Ok(()));
        let token = signed_in(&ep);
        let mut rng = StdRng::seed_from_u64(1);
        for bad in [input("", 500.0, 1), input("JFK", 0.0, 1), input("JFK", 500.0, 7), input("NEWYORK", 500.0, 1)] {
            let err = ep.handle_on(bad, Some(&token), today(), &mut rng, &ep.control()).unwrap_err();
            assert_eq!(err.code(), "INVALID_INPUT");
        }
        assert!(ep.engine.api().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_live_result_carries_message() {
        let ep = endpoint(Ok(()));
        let token = signed_in(&ep);
        let mut rng = StdRng::seed_from_u64(1);
        let resp = ep.handle_on(input("JFK", 50.0, 1), Some(&token), today(), &mut rng, &ep.control()).unwrap();

        assert_eq!(resp.count, 0);
        assert_eq!(resp.message.as_deref(), Some(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn upstream_failure_falls_back_to_mock_when_enabled() {
        let ep = endpoint(Err(SearchError::Upstream("token endpoint timed out".into())));
        let token = signed_in(&ep);
        let mut rng = StdRng::seed_from_u64(3);
        let resp = ep.handle_on(input("JFK", 800.0, 3), Some(&token), today(), &mut rng, &ep.control()).unwrap();
        assert_eq!(resp.source, OfferSource::Mock);

        let ep = ep.with_mock_fallback(false);
        let err = ep.handle_on(input("JFK", 800.0, 3), Some(&token), today(), &mut rng, &ep.control()).unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
    }

    #[test]
    fn auth_and_config_failures_propagate() {
        for err in [
            SearchError::Auth("invalid_client".into()),
            SearchError::Configuration("AMADEUS_API_KEY missing".into()),
        ] {
            let ep = endpoint(Err(err.clone()));
            let token = signed_in(&ep);
            let mut rng = StdRng::seed_from_u64(3);
            let got = ep.handle_on(input("JFK", 500.0, 1), Some(&token), today(), &mut rng, &ep.control()).unwrap_err();
            assert_eq!(got, err);
            assert_eq!(*ep.engine.api().calls.lock().unwrap(), vec!["authenticate"]);
        }
    }

    #[test]
    fn cancelled_control_stops_live_probes() {
        let ep = endpoint(Ok(()));
        let token = signed_in(&ep);
        let control = ep.control();
        control.cancel_handle().cancel();

        let mut rng = StdRng::seed_from_u64(5);
        let resp = ep.handle_on(input("JFK", 500.0, 1), Some(&token), today(), &mut rng, &control).unwrap();

        assert_eq!(resp.source, OfferSource::Live);
        assert_eq!(resp.count, 0);
        assert_eq!(*ep.engine.api().calls.lock().unwrap(), vec!["authenticate"]);
    }

    #[test]
    fn mock_offers_ignore_basic_economy_exclusion() {
        let ep = endpoint(Ok(()));
        let mut rng = StdRng::seed_from_u64(11);
        let mut excluded = input("JFK", 800.0, 2);
        excluded.exclude_basic_economy = true;
        let resp = ep.handle_on(excluded, None, today(), &mut rng, &ep.control()).unwrap();

        assert_eq!(resp.source, OfferSource::Mock);
        assert!(resp.count > 0);
        assert!(resp.results.iter().all(|o| o.fare_class_note.is_none()));
    }

    #[test]
    fn response_serializes_camel_case() {
        let resp = SearchResponse::new(Vec::new(), OfferSource::Mock);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["source"], "mock");
        assert_eq!(json["message"], NO_RESULTS_MESSAGE);
    }
}
