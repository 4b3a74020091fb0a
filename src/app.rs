//! Top-level application orchestration.
//!
//! `src/main.rs` only installs logging; this module parses arguments, runs the
//! search pipeline, and prints or exports the results.

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{AirportsArgs, Command, SearchArgs};
use crate::error::AppError;

pub mod pipeline;

/// Everything one `fares search` invocation needs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub origin: String,
    pub max_budget: f64,
    pub months_ahead: i64,
    pub exclude_basic_economy: bool,
    pub email: Option<String>,
    pub top_n: usize,
    pub json: bool,
    pub export: Option<PathBuf>,
}

/// Entry point for the `fares` binary.
pub fn run() -> Result<(), AppError> {
    // `fares -o JFK -b 300` is shorthand for `fares search -o JFK -b 300`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Search(args) => handle_search(args),
        Command::Airports(args) => handle_airports(args),
    }
}

fn handle_search(args: SearchArgs) -> Result<(), AppError> {
    let config = search_config_from_args(&args);
    let run = pipeline::run_search(&config)?;

    if config.json {
        let json = serde_json::to_string_pretty(&run.response)
            .map_err(|e| AppError::new(2, format!("Failed to encode results: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_search_summary(&run));
        println!("{}", crate::report::format_offers(&run.response.results, config.top_n));
    }

    if let Some(path) = &config.export {
        crate::io::write_search_json(path, &run)?;
    }

    Ok(())
}

fn handle_airports(args: AirportsArgs) -> Result<(), AppError> {
    let matches = crate::airports::search_airports(&args.query, args.limit);
    if matches.is_empty() {
        return Err(AppError::new(2, format!("No airports match '{}'.", args.query)));
    }
    println!("{}", crate::report::format_airports(&matches));
    Ok(())
}

pub fn search_config_from_args(args: &SearchArgs) -> SearchConfig {
    SearchConfig {
        origin: args.origin.clone(),
        max_budget: args.max_budget,
        months_ahead: args.months_ahead,
        exclude_basic_economy: args.exclude_basic_economy,
        email: args.email.clone(),
        top_n: args.top,
        json: args.json,
        export: args.export.clone(),
    }
}

/// Rewrite argv so flags without a subcommand mean `search`.
///
/// Rules:
/// - `fares -o JFK ...`          -> `fares search -o JFK ...`
/// - `fares --help/--version/-h` -> unchanged
/// - `fares` / `fares <subcmd>`  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "search".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("fares").chain(args.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn bare_flags_default_to_search() {
        assert_eq!(rewrite_args(argv(&["-o", "JFK"])), argv(&["search", "-o", "JFK"]));
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        let cases: [&[&str]; 5] = [&["airports", "lon"], &["--help"], &["-V"], &["search", "-o", "JFK"], &[]];
        for args in cases {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn parsed_args_map_onto_config() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(&[
            "-o",
            "bos",
            "-b",
            "350",
            "--exclude-basic-economy",
            "--email",
            "a@b.co",
            "--top",
            "5",
        ])));
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        let config = search_config_from_args(&args);
        assert_eq!(config.origin, "bos");
        assert_eq!(config.max_budget, 350.0);
        assert_eq!(config.months_ahead, 3);
        assert!(config.exclude_basic_economy);
        assert_eq!(config.email.as_deref(), Some("a@b.co"));
        assert_eq!(config.top_n, 5);
        assert!(!config.json);
    }
}
