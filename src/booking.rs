//! Booking links for offers.
//!
//! Booking itself happens on a third-party site; we only build the URL the
//! user is sent to, optionally wrapped with an affiliate redirect.

use chrono::NaiveDate;
use reqwest::Url;

use crate::config::AffiliateSettings;

const SEARCH_BASE: &str = "https://www.skyscanner.com/transport/flights";
const AFFILIATE_BASE: &str = "https://www.travelpayouts.com/click";

#[derive(Debug, Clone, Default)]
pub struct BookingLinks {
    marker: Option<String>,
    sub_id: Option<String>,
}

impl BookingLinks {
    pub fn new(settings: &AffiliateSettings) -> Self {
        Self {
            marker: settings.marker.clone(),
            sub_id: settings.sub_id.clone(),
        }
    }

    /// URL for a one-way, one-adult search from `origin` to `destination` on `date`.
    pub fn link_for(&self, origin: &str, destination: &str, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d").to_string();
        let plain = with_params(
            SEARCH_BASE,
            &[
                ("from", origin),
                ("to", destination),
                ("depart", date.as_str()),
                ("adults", "1"),
            ],
        );
        self.wrap(&plain)
    }

    /// Wrap `url` in the affiliate redirect when a marker is configured.
    pub fn wrap(&self, url: &str) -> String {
        let Some(marker) = self.marker.as_deref() else {
            return url.to_string();
        };

        let mut params = vec![("shmarker", marker), ("url", url)];
        if let Some(sub_id) = self.sub_id.as_deref() {
            params.push(("subid", sub_id));
        }
        with_params(AFFILIATE_BASE, &params)
    }
}

fn with_params(base: &str, params: &[(&str, &str)]) -> String {
    match Url::parse_with_params(base, params) {
        Ok(url) => url.into(),
        Err(_) => base.to_string(),
    }
}
