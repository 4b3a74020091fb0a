//! Runtime settings loaded from the environment (and `.env`).

use std::collections::HashMap;
use std::time::Duration;

use crate::error::SearchError;

pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_DEADLINE_SECS: u64 = 90;
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Client credentials for the pricing API.
///
/// Both halves are optional at load time; a missing credential is reported by
/// `PricingApi::authenticate` so that unauthenticated (mock) searches still work.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id.as_ref().map(|_| "<set>"))
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PricingSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AffiliateSettings {
    pub marker: Option<String>,
    pub sub_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub pricing: PricingSettings,
    /// Overall wall-clock budget for one live search.
    pub search_deadline: Duration,
    /// Worker-pool size for pricing probes.
    pub max_concurrency: usize,
    /// Serve mock offers when a live search fails with an upstream error.
    pub mock_fallback: bool,
    pub affiliate: AffiliateSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pricing: PricingSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                credentials: Credentials::default(),
                http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            },
            search_deadline: Duration::from_secs(DEFAULT_SEARCH_DEADLINE_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            mock_fallback: true,
            affiliate: AffiliateSettings {
                marker: None,
                sub_id: None,
            },
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SearchError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SearchError> {
        let get = |name: &str| vars.get(name).and_then(|v| clean_value(v));
        let defaults = Settings::default();

        let http_timeout = match get("FARES_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("FARES_HTTP_TIMEOUT_SECS", &raw)?),
            None => defaults.pricing.http_timeout,
        };
        let search_deadline = match get("FARES_SEARCH_DEADLINE_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("FARES_SEARCH_DEADLINE_SECS", &raw)?),
            None => defaults.search_deadline,
        };
        let max_concurrency = match get("FARES_MAX_CONCURRENCY") {
            Some(raw) => parse_positive("FARES_MAX_CONCURRENCY", &raw)? as usize,
            None => defaults.max_concurrency,
        };
        let mock_fallback = match get("FARES_MOCK_FALLBACK") {
            Some(raw) => parse_bool("FARES_MOCK_FALLBACK", &raw)?,
            None => defaults.mock_fallback,
        };

        Ok(Self {
            pricing: PricingSettings {
                base_url: get("AMADEUS_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.pricing.base_url),
                credentials: Credentials {
                    client_id: get("AMADEUS_API_KEY"),
                    client_secret: get("AMADEUS_API_SECRET"),
                },
                http_timeout,
            },
            search_deadline,
            max_concurrency,
            mock_fallback,
            affiliate: AffiliateSettings {
                marker: get("FARES_AFFILIATE_MARKER"),
                sub_id: get("FARES_AFFILIATE_SUB_ID"),
            },
        })
    }
}

/// Trim whitespace and one layer of accidental quoting; empty means unset.
pub fn clean_value(raw: &str) -> Option<String> {
    let mut v = raw.trim();
    for quote in ['"', '\''] {
        if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
            v = v[1..v.len() - 1].trim();
        }
    }
    if v.is_empty() { None } else { Some(v.to_string()) }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64, SearchError> {
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(SearchError::Configuration(format!(
            "{name} must be a positive integer, got '{raw}'."
        ))),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, SearchError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SearchError::Configuration(format!(
            "{name} must be a boolean, got '{raw}'."
        ))),
    }
}
