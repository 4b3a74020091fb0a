//! Destination discovery bookkeeping: tallying, ranking, and the static fallback.

use std::collections::HashMap;

use crate::airports::find_airport;
use crate::domain::DestinationCandidate;
use crate::pricing::DiscoveredDestination;

/// High-traffic airports, busiest first, used when discovery finds nothing.
pub const FALLBACK_DESTINATIONS: [&str; 24] = [
    "ATL", "LAX", "ORD", "DFW", "DEN", "JFK", "LAS", "MCO", "MIA", "CLT", "SEA", "PHX", "EWR", "SFO",
    "IAH", "BOS", "FLL", "MSP", "LGA", "DTW", "LHR", "CDG", "CUN", "MEX",
];

/// Running destination → appearance count, in first-seen order.
#[derive(Debug, Default)]
pub struct CandidateTally {
    order: Vec<DestinationCandidate>,
    index: HashMap<String, usize>,
}

impl CandidateTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one key date's discovery results.
    ///
    /// A destination listed twice on the same date still counts once for that date.
    pub fn record_date(&mut self, origin: &str, found: &[DiscoveredDestination]) {
        let mut seen_today: Vec<&str> = Vec::with_capacity(found.len());
        for d in found {
            let code = d.code.as_str();
            if code == origin || seen_today.contains(&code) {
                continue;
            }
            seen_today.push(code);

            match self.index.get(code) {
                Some(&i) => {
                    let entry = &mut self.order[i];
                    entry.appearance_count += 1;
                    if entry.name.is_none() {
                        entry.name = d.name.clone();
                    }
                }
                None => {
                    self.index.insert(code.to_string(), self.order.len());
                    self.order.push(DestinationCandidate {
                        code: code.to_string(),
                        name: d.name.clone(),
                        appearance_count: 1,
                    });
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Highest appearance count first (ties keep first-seen order), capped at `limit`.
    pub fn ranked(self, limit: usize) -> Vec<DestinationCandidate> {
        let mut out = self.order;
        out.sort_by(|a, b| b.appearance_count.cmp(&a.appearance_count));
        out.truncate(limit);
        out
    }
}

/// Static candidates (priority 1) excluding `origin`, capped at `limit`.
pub fn fallback_candidates(origin: &str, limit: usize) -> Vec<DestinationCandidate> {
    FALLBACK_DESTINATIONS
        .iter()
        .filter(|code| **code != origin)
        .take(limit)
        .map(|code| DestinationCandidate {
            code: code.to_string(),
            name: find_airport(code).map(|a| a.city.to_string()),
            appearance_count: 1,
        })
        .collect()
}
