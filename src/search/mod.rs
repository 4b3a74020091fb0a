//! Budget-first flight discovery.
//!
//! - `plan`: which dates to sample
//! - `candidates`: discovery tallying and the static fallback list
//! - `result_set`: best offer per destination
//! - `filter`: basic-economy exclusion
//! - `engine`: the orchestration tying these together

pub mod candidates;
pub mod engine;
pub mod filter;
pub mod plan;
pub mod result_set;

pub use candidates::{CandidateTally, FALLBACK_DESTINATIONS, fallback_candidates};
pub use engine::{AggregationEngine, CancelHandle, ProbeStats, SearchControl, SearchOutcome};
pub use filter::{apply_fare_filter, is_basic_economy};
pub use plan::{DateWindow, SamplingPlan};
pub use result_set::ResultSet;
