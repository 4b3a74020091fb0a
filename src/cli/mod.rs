//! Command-line parsing for the `fares` binary.
//!
//! Parsing and dispatch live apart from the search code so the library stays
//! usable without a terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fares", version, about = "Budget-first flight discovery")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the cheapest destinations reachable within a budget.
    Search(SearchArgs),
    /// Look up airports by code, city, or name.
    Airports(AirportsArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// Departure airport (IATA code, e.g. JFK).
    #[arg(short = 'o', long)]
    pub origin: String,

    /// Maximum one-way price in USD.
    #[arg(short = 'b', long = "budget")]
    pub max_budget: f64,

    /// How many months ahead to search (1-6).
    #[arg(short = 'm', long = "months", default_value_t = 3)]
    pub months_ahead: i64,

    /// Drop basic-economy fares.
    #[arg(long)]
    pub exclude_basic_economy: bool,

    /// Sign in with this email to search live fares (otherwise mock offers are shown).
    #[arg(long)]
    pub email: Option<String>,

    /// Show at most N offers.
    #[arg(long, default_value_t = 30)]
    pub top: usize,

    /// Print the response as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Write the request and results to a JSON file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct AirportsArgs {
    /// Code prefix, city, or airport name.
    pub query: String,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}
