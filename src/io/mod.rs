//! File output.
//!
//! - search result export to JSON (`export`)

pub mod export;

pub use export::*;
