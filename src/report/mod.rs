//! Terminal output for search results and airport lookups.
//!
//! Formatting stays here so the search code never prints.

pub mod format;

pub use format::*;
