//! Amadeus self-service API integration (flight inspiration + flight offers).

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::airports::find_airport;
use crate::booking::BookingLinks;
use crate::config::{PricingSettings, clean_value};
use crate::domain::{FareOffer, OfferSource};
use crate::error::SearchError;
use crate::pricing::{AccessToken, DiscoveredDestination, PricingApi, ProbeOutcome};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const DESTINATIONS_PATH: &str = "/v1/shopping/flight-destinations";
const OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const OFFERS_PER_PROBE: &str = "10";
const DEFAULT_CURRENCY: &str = "USD";

pub struct AmadeusClient {
    client: Client,
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    links: BookingLinks,
}

impl AmadeusClient {
    pub fn new(settings: &PricingSettings, links: BookingLinks) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| SearchError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: settings.credentials.client_id.as_deref().and_then(clean_value),
            client_secret: settings.credentials.client_secret.as_deref().and_then(clean_value),
            links,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        token: &AccessToken,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProbeOutcome> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token.as_str())
            .query(query)
            .send()
            .map_err(|e| {
                warn!(path, error = %e, "pricing request failed");
                ProbeOutcome::TransientError
            })?;

        let status = resp.status();
        if !status.is_success() {
            let outcome = classify_status(status);
            match outcome {
                ProbeOutcome::NotFound => debug!(path, %status, "no data for probe"),
                _ => warn!(path, %status, ?outcome, "pricing probe rejected"),
            }
            return Err(outcome);
        }

        resp.json::<T>().map_err(|e| {
            warn!(path, error = %e, "failed to parse pricing response");
            ProbeOutcome::TransientError
        })
    }
}

impl PricingApi for AmadeusClient {
    fn authenticate(&self) -> Result<AccessToken, SearchError> {
        let (Some(client_id), Some(client_secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            return Err(SearchError::Configuration(
                "Missing AMADEUS_API_KEY / AMADEUS_API_SECRET in environment (.env).".to_string(),
            ));
        };
        if client_id.chars().any(char::is_whitespace) || client_secret.chars().any(char::is_whitespace) {
            return Err(SearchError::Configuration(
                "Pricing credentials contain whitespace; check AMADEUS_API_KEY / AMADEUS_API_SECRET.".to_string(),
            ));
        }

        let resp = self
            .client
            .post(self.url(TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .map_err(|e| SearchError::Upstream(format!("Token request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(token_error(status, resp.json::<TokenErrorBody>().ok()));
        }

        let body: TokenResponse = resp
            .json()
            .map_err(|e| SearchError::Upstream(format!("Failed to parse token response: {e}")))?;
        if body.access_token.trim().is_empty() {
            return Err(SearchError::Upstream("Token response carried an empty access token.".to_string()));
        }
        debug!(expires_in = ?body.expires_in, "pricing token issued");
        Ok(AccessToken::new(body.access_token))
    }

    fn discover_destinations(
        &self,
        token: &AccessToken,
        origin: &str,
        max_budget: f64,
        date: NaiveDate,
    ) -> Result<Vec<DiscoveredDestination>, ProbeOutcome> {
        let max_price = whole_price(max_budget);
        let date_str = date.to_string();
        let response = self.get_json(
            token,
            DESTINATIONS_PATH,
            &[
                ("origin", origin),
                ("maxPrice", &max_price),
                ("departureDate", &date_str),
                ("oneWay", "true"),
            ],
        );
        discovery_result(response, origin)
    }

    fn price_offer(
        &self,
        token: &AccessToken,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        max_budget: f64,
    ) -> Result<FareOffer, ProbeOutcome> {
        let max_price = whole_price(max_budget);
        let date_str = date.to_string();
        let body: OffersResponse = self.get_json(
            token,
            OFFERS_PATH,
            &[
                ("originLocationCode", origin),
                ("destinationLocationCode", destination),
                ("departureDate", &date_str),
                ("adults", "1"),
                ("maxPrice", &max_price),
                ("currencyCode", DEFAULT_CURRENCY),
                ("max", OFFERS_PER_PROBE),
            ],
        )?;

        let mut offer = cheapest_offer(body, destination, date, max_budget).ok_or(ProbeOutcome::NotFound)?;
        offer.booking_reference = self.links.link_for(origin, destination, offer.departure_date);
        Ok(offer)
    }
}

/// Map a non-success probe status onto a `ProbeOutcome`.
pub fn classify_status(status: StatusCode) -> ProbeOutcome {
    match status {
        StatusCode::NOT_FOUND => ProbeOutcome::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ProbeOutcome::RateLimited,
        _ => ProbeOutcome::TransientError,
    }
}

/// Map a non-success token response onto the search error taxonomy.
fn token_error(status: StatusCode, body: Option<TokenErrorBody>) -> SearchError {
    let (error, description) = body.map(|b| (b.error, b.error_description)).unwrap_or_default();
    let credentials_rejected = error
        .iter()
        .chain(description.iter())
        .any(|text| text.to_ascii_lowercase().contains("client"));
    let detail = description
        .or(error)
        .unwrap_or_else(|| status.to_string());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        SearchError::Auth(detail)
    } else if status == StatusCode::BAD_REQUEST && credentials_rejected {
        // invalid_client / unauthorized_client are credential problems, not outages.
        SearchError::Auth(detail)
    } else {
        SearchError::Upstream(format!("Token endpoint returned {status}: {detail}"))
    }
}

/// The upstream only accepts whole-unit price caps.
fn whole_price(max_budget: f64) -> String {
    format!("{}", max_budget.floor().max(1.0) as u64)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Dictionaries {
    #[serde(default)]
    locations: HashMap<String, LocationInfo>,
    #[serde(default)]
    carriers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationInfo {
    detailed_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestinationsResponse {
    #[serde(default)]
    data: Vec<DestinationEntry>,
    #[serde(default)]
    dictionaries: Option<Dictionaries>,
}

#[derive(Debug, Deserialize)]
struct DestinationEntry {
    destination: String,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<OfferEntry>,
    #[serde(default)]
    dictionaries: Option<Dictionaries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferEntry {
    price: OfferPrice,
    #[serde(default)]
    validating_airline_codes: Vec<String>,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
    #[serde(default)]
    traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    total: String,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    departure: SegmentEndpoint,
    carrier_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SegmentEndpoint {
    at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TravelerPricing {
    #[serde(default)]
    fare_details_by_segment: Vec<FareDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FareDetails {
    cabin: Option<String>,
    branded_fare: Option<String>,
    branded_fare_label: Option<String>,
}

/// "No destination found" (404) is an empty sample, not a failure.
fn discovery_result(
    response: Result<DestinationsResponse, ProbeOutcome>,
    origin: &str,
) -> Result<Vec<DiscoveredDestination>, ProbeOutcome> {
    match response {
        Ok(body) => Ok(parse_destinations(body, origin)),
        Err(ProbeOutcome::NotFound) => Ok(Vec::new()),
        Err(outcome) => Err(outcome),
    }
}

fn parse_destinations(body: DestinationsResponse, origin: &str) -> Vec<DiscoveredDestination> {
    let dictionaries = body.dictionaries.unwrap_or_default();
    let mut out: Vec<DiscoveredDestination> = Vec::with_capacity(body.data.len());
    for entry in body.data {
        let code = entry.destination.trim().to_ascii_uppercase();
        if code.is_empty() || code == origin || out.iter().any(|d| d.code == code) {
            continue;
        }
        let name = dictionaries
            .locations
            .get(&code)
            .and_then(|l| l.detailed_name.clone())
            .or_else(|| find_airport(&code).map(|a| a.city.to_string()));
        out.push(DiscoveredDestination { code, name });
    }
    out
}

fn cheapest_offer(
    body: OffersResponse,
    destination: &str,
    probed_date: NaiveDate,
    max_budget: f64,
) -> Option<FareOffer> {
    let dictionaries = body.dictionaries.unwrap_or_default();

    let (price, entry) = body
        .data
        .into_iter()
        .filter_map(|entry| {
            let price = entry.price.total.trim().parse::<f64>().ok()?;
            (price.is_finite() && price > 0.0 && price <= max_budget).then_some((price, entry))
        })
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;

    let first_segment = entry.itineraries.first().and_then(|i| i.segments.first());
    let departure_date = first_segment
        .and_then(|s| s.departure.at.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or(probed_date);

    let carrier = entry
        .validating_airline_codes
        .first()
        .cloned()
        .or_else(|| first_segment.and_then(|s| s.carrier_code.clone()));
    let airline = match carrier {
        Some(code) => dictionaries.carriers.get(&code).cloned().unwrap_or(code),
        None => "Unknown".to_string(),
    };

    let fare_class_raw = entry
        .traveler_pricings
        .first()
        .and_then(|tp| tp.fare_details_by_segment.first())
        .and_then(|fd| {
            fd.branded_fare_label
                .clone()
                .or_else(|| fd.branded_fare.clone())
                .or_else(|| fd.cabin.clone())
        });

    let destination_name = find_airport(destination)
        .map(|a| a.city.to_string())
        .unwrap_or_else(|| destination.to_string());

    Some(FareOffer {
        destination_code: destination.to_string(),
        destination_name,
        price,
        currency: entry.price.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        departure_date,
        airline,
        fare_class_raw,
        booking_reference: String::new(),
        source: OfferSource::Live,
        fare_class_note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Settings};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), ProbeOutcome::NotFound);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), ProbeOutcome::RateLimited);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), ProbeOutcome::TransientError);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), ProbeOutcome::TransientError);
    }

    fn token_body(error: &str, description: Option<&str>) -> Option<TokenErrorBody> {
        Some(TokenErrorBody {
            error: Some(error.to_string()),
            error_description: description.map(str::to_string),
        })
    }

    #[test]
    fn rejected_credentials_are_auth_errors() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(token_error(status, None), SearchError::Auth(_)), "{status}");
        }
        let err = token_error(
            StatusCode::BAD_REQUEST,
            token_body("invalid_client", Some("Client credentials are invalid")),
        );
        assert_eq!(err, SearchError::Auth("Client credentials are invalid".to_string()));
        let err = token_error(StatusCode::BAD_REQUEST, token_body("unauthorized_client", None));
        assert_eq!(err.code(), "AUTHENTICATION_FAILED");
    }

    #[test]
    fn other_token_failures_are_upstream_errors() {
        let err = token_error(
            StatusCode::BAD_REQUEST,
            token_body("invalid_grant", Some("grant_type is not supported")),
        );
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
        assert!(err.is_retryable());

        let err = token_error(StatusCode::SERVICE_UNAVAILABLE, None);
        assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
        assert!(err.to_string().contains("503"));

        assert_eq!(token_error(StatusCode::BAD_REQUEST, None).code(), "UPSTREAM_UNAVAILABLE");
    }

    #[test]
    fn discovery_not_found_is_an_empty_sample() {
        assert_eq!(discovery_result(Err(ProbeOutcome::NotFound), "JFK"), Ok(Vec::new()));
        assert_eq!(
            discovery_result(Err(ProbeOutcome::RateLimited), "JFK"),
            Err(ProbeOutcome::RateLimited)
        );
        assert_eq!(
            discovery_result(Err(ProbeOutcome::TransientError), "JFK"),
            Err(ProbeOutcome::TransientError)
        );
        let body: DestinationsResponse =
            serde_json::from_str(r#"{"data": [{"destination": "MIA"}]}"#).unwrap();
        assert_eq!(discovery_result(Ok(body), "JFK").unwrap()[0].code, "MIA");
    }

    #[test]
    fn whole_price_floors() {
        assert_eq!(whole_price(499.99), "499");
        assert_eq!(whole_price(0.5), "1");
    }

    #[test]
    fn destinations_skip_origin_and_duplicates() {
        let body: DestinationsResponse = serde_json::from_str(
            r#"{
                "data": [
                    {"type": "flight-destination", "origin": "JFK", "destination": "LAX", "price": {"total": "120.00"}},
                    {"type": "flight-destination", "origin": "JFK", "destination": "JFK", "price": {"total": "1.00"}},
                    {"type": "flight-destination", "origin": "JFK", "destination": "lax", "price": {"total": "130.00"}},
                    {"type": "flight-destination", "origin": "JFK", "destination": "XYZ", "price": {"total": "90.00"}}
                ],
                "dictionaries": {"locations": {"XYZ": {"subType": "CITY", "detailedName": "SOMEWHERE"}}}
            }"#,
        )
        .unwrap();
        let out = parse_destinations(body, "JFK");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].code, "LAX");
        assert_eq!(out[0].name.as_deref(), Some("Los Angeles"));
        assert_eq!(out[1].name.as_deref(), Some("SOMEWHERE"));
    }

    #[test]
    fn empty_destination_payload_is_empty_list() {
        let body: DestinationsResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_destinations(body, "JFK").is_empty());
    }

    #[test]
    fn cheapest_offer_within_budget_wins() {
        let body: OffersResponse = serde_json::from_str(
            r#"{
                "data": [
                    {"id": "1", "price": {"total": "610.00", "currency": "USD"}, "validatingAirlineCodes": ["UA"]},
                    {"id": "2", "price": {"total": "289.40", "currency": "USD"}, "validatingAirlineCodes": ["AA"],
                     "itineraries": [{"segments": [{"departure": {"at": "2026-11-21T07:15:00"}, "carrierCode": "AA"}]}],
                     "travelerPricings": [{"fareDetailsBySegment": [{"cabin": "ECONOMY", "brandedFare": "BASIC"}]}]},
                    {"id": "3", "price": {"total": "301.00", "currency": "USD"}, "validatingAirlineCodes": ["DL"]}
                ],
                "dictionaries": {"carriers": {"AA": "AMERICAN AIRLINES"}}
            }"#,
        )
        .unwrap();
        let offer = cheapest_offer(body, "LAX", date(), 500.0).unwrap();
        assert_eq!(offer.price, 289.40);
        assert_eq!(offer.airline, "AMERICAN AIRLINES");
        assert_eq!(offer.fare_class_raw.as_deref(), Some("BASIC"));
        assert_eq!(offer.departure_date, NaiveDate::from_ymd_opt(2026, 11, 21).unwrap());
        assert_eq!(offer.destination_name, "Los Angeles");
        assert_eq!(offer.source, OfferSource::Live);
    }

    #[test]
    fn offers_over_budget_yield_none() {
        let body: OffersResponse = serde_json::from_str(
            r#"{"data": [{"price": {"total": "510.00"}}, {"price": {"total": "not-a-number"}}]}"#,
        )
        .unwrap();
        assert!(cheapest_offer(body, "LAX", date(), 500.0).is_none());
    }

    #[test]
    fn missing_fare_details_leave_fare_class_empty() {
        let body: OffersResponse =
            serde_json::from_str(r#"{"data": [{"price": {"total": "99.00"}}]}"#).unwrap();
        let offer = cheapest_offer(body, "QQQ", date(), 500.0).unwrap();
        assert!(offer.fare_class_raw.is_none());
        assert_eq!(offer.airline, "Unknown");
        assert_eq!(offer.currency, "USD");
        assert_eq!(offer.destination_name, "QQQ");
        assert_eq!(offer.departure_date, date());
    }

    #[test]
    fn authenticate_without_credentials_is_configuration_error() {
        let settings = Settings::default();
        let client = AmadeusClient::new(&settings.pricing, BookingLinks::default()).unwrap();
        let err = client.authenticate().unwrap_err();
        assert_eq!(err.code(), "SERVICE_NOT_CONFIGURED");
    }

    #[test]
    fn authenticate_rejects_malformed_credentials_before_network() {
        let mut settings = Settings::default();
        settings.pricing.credentials = Credentials {
            client_id: Some("\"abc def\"".into()),
            client_secret: Some("secret".into()),
        };
        let client = AmadeusClient::new(&settings.pricing, BookingLinks::default()).unwrap();
        let err = client.authenticate().unwrap_err();
        assert_eq!(err.code(), "SERVICE_NOT_CONFIGURED");
    }
}
