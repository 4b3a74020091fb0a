//! Domain types used throughout the search pipeline.
//!
//! This module defines:
//!
//! - caller input and the validated `SearchRequest`
//! - priced results (`FareOffer`) and discovery scores (`DestinationCandidate`)

pub mod types;

pub use types::*;
