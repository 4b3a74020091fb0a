//! `fare-scout` library crate.
//!
//! The binary (`fares`) is a thin wrapper around this library so that:
//!
//! - the search pipeline is testable without spawning processes or touching the network
//! - the endpoint can be mounted behind another front-end (HTTP handler, job runner)

pub mod airports;
pub mod app;
pub mod auth;
pub mod booking;
pub mod cli;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod io;
pub mod pricing;
pub mod report;
pub mod search;
