//! Multi-stage flight-offer aggregation.
//!
//! Pipeline for one search:
//! 1. authenticate once (failure aborts before any probe)
//! 2. discover destinations on the plan's key dates (parallel)
//! 3. rank candidates by appearance count, or fall back to a static list
//! 4. price each candidate on its share of the search dates (parallel, one
//!    worker per candidate so each destination's running minimum has a single writer)
//! 5. merge into a best-per-destination `ResultSet`, apply the fare filter, sort

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{DestinationCandidate, FareOffer, SearchRequest};
use crate::error::SearchError;
use crate::pricing::{AccessToken, DiscoveredDestination, PricingApi, ProbeOutcome};
use crate::search::candidates::{CandidateTally, fallback_candidates};
use crate::search::filter::apply_fare_filter;
use crate::search::plan::SamplingPlan;
use crate::search::result_set::{ResultSet, sort_by_price};

/// Deadline and cancellation shared by every probe of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

/// Handle that aborts the probes of an in-flight search.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl SearchControl {
    /// No deadline; only explicit cancellation stops the search.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_deadline(budget: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + budget),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn should_stop(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Probe counters for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeStats {
    pub discovery_calls: usize,
    pub pricing_calls: usize,
    pub offers_found: usize,
    pub not_found: usize,
    pub rate_limited: usize,
    pub transient_errors: usize,
    /// Probes never issued because the deadline passed or the search was cancelled.
    pub skipped: usize,
}

impl ProbeStats {
    fn record(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::NotFound => self.not_found += 1,
            ProbeOutcome::RateLimited => self.rate_limited += 1,
            ProbeOutcome::TransientError => self.transient_errors += 1,
        }
    }

    fn merge(&mut self, other: &ProbeStats) {
        self.discovery_calls += other.discovery_calls;
        self.pricing_calls += other.pricing_calls;
        self.offers_found += other.offers_found;
        self.not_found += other.not_found;
        self.rate_limited += other.rate_limited;
        self.transient_errors += other.transient_errors;
        self.skipped += other.skipped;
    }
}

/// Everything a search produced, for callers that want more than the offer list.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Filtered, deduplicated offers, cheapest first.
    pub offers: Vec<FareOffer>,
    /// Candidates that were priced, in probe priority order.
    pub candidates: Vec<DestinationCandidate>,
    pub used_fallback: bool,
    pub key_dates: Vec<NaiveDate>,
    pub search_dates: Vec<NaiveDate>,
    pub stats: ProbeStats,
}

pub struct AggregationEngine<P> {
    api: P,
    plan: SamplingPlan,
    max_concurrency: usize,
}

impl<P: PricingApi> AggregationEngine<P> {
    pub fn new(api: P) -> Self {
        Self {
            api,
            plan: SamplingPlan::default(),
            max_concurrency: 4,
        }
    }

    pub fn with_plan(mut self, plan: SamplingPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    /// Search departing from tomorrow, without a deadline.
    pub fn search_flights(&self, request: &SearchRequest) -> Result<Vec<FareOffer>, SearchError> {
        let today = Local::now().date_naive();
        self.run(request, today, &SearchControl::unbounded())
            .map(|outcome| outcome.offers)
    }

    /// Full search relative to `today`.
    ///
    /// Only authentication failures are returned as errors; probe failures
    /// shrink the result instead.
    pub fn run(
        &self,
        request: &SearchRequest,
        today: NaiveDate,
        control: &SearchControl,
    ) -> Result<SearchOutcome, SearchError> {
        let token = self.api.authenticate().inspect_err(|e| {
            warn!(code = e.code(), error = %e, "pricing authentication failed; aborting search");
        })?;

        let window = self.plan.window(today, request.months_ahead());
        let key_dates = self.plan.key_dates(window);
        let search_dates = self.plan.search_dates(window);
        info!(
            origin = request.origin(),
            budget = request.max_budget(),
            key_dates = key_dates.len(),
            search_dates = search_dates.len(),
            "starting fare search"
        );

        let work = || self.probe_all(&token, request, &key_dates, &search_dates, control);
        let (candidates, used_fallback, result_set, stats) =
            match rayon::ThreadPoolBuilder::new().num_threads(self.max_concurrency).build() {
                Ok(pool) => pool.install(work),
                Err(e) => {
                    warn!(error = %e, "failed to build probe pool; using the global pool");
                    work()
                }
            };

        if stats.skipped > 0 {
            warn!(skipped = stats.skipped, "search deadline reached or cancelled; returning partial results");
        }

        let unfiltered = result_set.len();
        let mut offers = apply_fare_filter(result_set.into_sorted_vec(), request.exclude_basic_economy());
        sort_by_price(&mut offers);

        info!(
            destinations = unfiltered,
            returned = offers.len(),
            pricing_calls = stats.pricing_calls,
            not_found = stats.not_found,
            rate_limited = stats.rate_limited,
            transient_errors = stats.transient_errors,
            skipped = stats.skipped,
            "fare search finished"
        );

        Ok(SearchOutcome {
            offers,
            candidates,
            used_fallback,
            key_dates,
            search_dates,
            stats,
        })
    }

    fn probe_all(
        &self,
        token: &AccessToken,
        request: &SearchRequest,
        key_dates: &[NaiveDate],
        search_dates: &[NaiveDate],
        control: &SearchControl,
    ) -> (Vec<DestinationCandidate>, bool, ResultSet, ProbeStats) {
        let mut stats = ProbeStats::default();

        let discovered: Vec<Option<Result<Vec<DiscoveredDestination>, ProbeOutcome>>> = key_dates
            .par_iter()
            .map(|&date| {
                if control.should_stop() {
                    return None;
                }
                let found = self
                    .api
                    .discover_destinations(token, request.origin(), request.max_budget(), date);
                match &found {
                    Ok(list) => debug!(%date, count = list.len(), "discovery probe"),
                    Err(outcome) => warn!(%date, %outcome, "discovery probe failed"),
                }
                Some(found)
            })
            .collect();

        let mut tally = CandidateTally::new();
        for result in discovered {
            match result {
                None => stats.skipped += 1,
                Some(Ok(found)) => {
                    stats.discovery_calls += 1;
                    tally.record_date(request.origin(), &found);
                }
                Some(Err(outcome)) => {
                    stats.discovery_calls += 1;
                    stats.record(outcome);
                }
            }
        }

        let used_fallback = tally.is_empty();
        let candidates = if used_fallback {
            warn!(origin = request.origin(), "discovery found nothing; using fallback destinations");
            fallback_candidates(request.origin(), self.plan.max_fallback)
        } else {
            info!(discovered = tally.len(), "destination discovery complete");
            tally.ranked(self.plan.max_candidates)
        };
        info!(
            candidates = candidates.len(),
            max_pricing_calls = self.plan.max_pricing_calls(&candidates, search_dates),
            "pricing candidates"
        );

        let priced: Vec<(Option<FareOffer>, ProbeStats)> = candidates
            .par_iter()
            .map(|candidate| self.probe_candidate(token, request, candidate, search_dates, control))
            .collect();

        let mut result_set = ResultSet::new();
        for (best, candidate_stats) in priced {
            stats.merge(&candidate_stats);
            if let Some(offer) = best {
                result_set.offer(offer);
            }
        }

        (candidates, used_fallback, result_set, stats)
    }

    /// Price one destination across its dates and keep the cheapest offer within budget.
    fn probe_candidate(
        &self,
        token: &AccessToken,
        request: &SearchRequest,
        candidate: &DestinationCandidate,
        search_dates: &[NaiveDate],
        control: &SearchControl,
    ) -> (Option<FareOffer>, ProbeStats) {
        let mut stats = ProbeStats::default();
        let mut best: Option<FareOffer> = None;

        if candidate.code == request.origin() {
            return (None, stats);
        }

        for date in self.plan.dates_for(candidate, search_dates) {
            if control.should_stop() {
                stats.skipped += 1;
                continue;
            }

            stats.pricing_calls += 1;
            let mut offer = match self.api.price_offer(
                token,
                request.origin(),
                &candidate.code,
                date,
                request.max_budget(),
            ) {
                Ok(offer) => offer,
                Err(outcome) => {
                    stats.record(outcome);
                    match outcome {
                        ProbeOutcome::NotFound => debug!(destination = %candidate.code, %date, "no offer"),
                        _ => warn!(destination = %candidate.code, %date, %outcome, "pricing probe failed"),
                    }
                    continue;
                }
            };

            if !(offer.price.is_finite() && offer.price > 0.0 && offer.price <= request.max_budget()) {
                stats.not_found += 1;
                continue;
            }
            stats.offers_found += 1;

            offer.destination_code = candidate.code.clone();
            if let Some(name) = &candidate.name {
                if offer.destination_name == offer.destination_code {
                    offer.destination_name = name.clone();
                }
            }

            if best.as_ref().is_none_or(|b| offer.price < b.price) {
                best = Some(offer);
            }
        }

        (best, stats)
    }
}
