//! Call-budget-bounded sampling over the date axis.
//!
//! Exhaustively pricing every destination on every day of a six-month window
//! is far too many metered calls. Instead we:
//! - discover destinations on a handful of evenly spread *key dates*
//! - price candidates on a weekly grid of *search dates*, probing the full
//!   grid only for destinations that showed up on more than one key date

use chrono::{Duration, Months, NaiveDate};

use crate::domain::DestinationCandidate;

/// Inclusive departure window for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }
}

/// Tunable sampling densities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingPlan {
    pub max_key_dates: usize,
    pub max_search_dates: usize,
    /// Candidates with `appearance_count` strictly above this probe every search date.
    pub high_priority_threshold: usize,
    /// Low-priority candidates always probe this many leading search dates.
    pub low_priority_head: usize,
    pub max_candidates: usize,
    pub max_fallback: usize,
    pub search_interval_days: i64,
    pub min_key_interval_days: i64,
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self {
            max_key_dates: 4,
            max_search_dates: 12,
            high_priority_threshold: 1,
            low_priority_head: 6,
            max_candidates: 30,
            max_fallback: 20,
            search_interval_days: 7,
            min_key_interval_days: 7,
        }
    }
}

impl SamplingPlan {
    /// `[today + 1 day, today + months_ahead months]`; the upstream rejects same-day departures.
    pub fn window(&self, today: NaiveDate, months_ahead: u32) -> DateWindow {
        let start = today + Duration::days(1);
        let end = today
            .checked_add_months(Months::new(months_ahead))
            .unwrap_or(start)
            .max(start);
        DateWindow { start, end }
    }

    /// Evenly spread discovery dates, interval `max(min_key_interval, span / 3)`.
    pub fn key_dates(&self, window: DateWindow) -> Vec<NaiveDate> {
        let interval = (window.span_days() / 3).max(self.min_key_interval_days).max(1);
        stepped(window, interval, self.max_key_dates)
    }

    /// Weekly pricing dates from the window start.
    pub fn search_dates(&self, window: DateWindow) -> Vec<NaiveDate> {
        stepped(window, self.search_interval_days.max(1), self.max_search_dates)
    }

    pub fn is_high_priority(&self, candidate: &DestinationCandidate) -> bool {
        candidate.appearance_count > self.high_priority_threshold
    }

    /// Search dates to probe for one candidate.
    ///
    /// High priority: all of them. Otherwise every other date plus the first
    /// `low_priority_head`, in date order.
    pub fn dates_for(&self, candidate: &DestinationCandidate, search_dates: &[NaiveDate]) -> Vec<NaiveDate> {
        if self.is_high_priority(candidate) {
            return search_dates.to_vec();
        }
        search_dates
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0 || *i < self.low_priority_head)
            .map(|(_, d)| *d)
            .collect()
    }

    /// Upper bound on pricing calls for a candidate list.
    pub fn max_pricing_calls(&self, candidates: &[DestinationCandidate], search_dates: &[NaiveDate]) -> usize {
        candidates.iter().map(|c| self.dates_for(c, search_dates).len()).sum()
    }
}

fn stepped(window: DateWindow, interval_days: i64, limit: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(limit);
    let mut d = window.start;
    while d <= window.end && out.len() < limit {
        out.push(d);
        d += Duration::days(interval_days);
    }
    out
}
