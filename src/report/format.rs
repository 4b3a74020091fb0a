//! Plain-text tables.

use crate::airports::{Airport, find_airport};
use crate::app::pipeline::SearchRun;
use crate::domain::{FareOffer, OfferSource};

/// Header block: what was searched and where the offers came from.
pub fn format_search_summary(run: &SearchRun) -> String {
    let mut out = String::new();
    let input = &run.input;
    let origin = input.origin.trim().to_ascii_uppercase();

    out.push_str("=== fares - budget-first flight search ===\n");
    match find_airport(&origin) {
        Some(a) => out.push_str(&format!("From: {} ({}, {})\n", a.code, a.city, a.country)),
        None => out.push_str(&format!("From: {origin}\n")),
    }
    out.push_str(&format!(
        "Budget: ${:.0} | window: {} month(s) | basic economy: {}\n",
        input.max_budget,
        input.months_ahead,
        if input.exclude_basic_economy { "excluded" } else { "included" },
    ));

    let source = match run.response.source {
        OfferSource::Live => "live fares",
        OfferSource::Mock => "sample fares (sign in with --email for live prices)",
    };
    out.push_str(&format!("Source: {source}\n"));
    if let Some(email) = &run.signed_in_as {
        out.push_str(&format!("Signed in as: {email}\n"));
    }
    out.push_str(&format!("Destinations: {}\n", run.response.count));
    if let Some(message) = &run.response.message {
        out.push_str(&format!("{message}\n"));
    }

    out
}

/// Ranked offer table, cheapest first, at most `top_n` rows.
pub fn format_offers(offers: &[FareOffer], top_n: usize) -> String {
    let mut out = String::new();
    if offers.is_empty() {
        return out;
    }

    push_row(
        &mut out,
        format!(
            "{:>3} {:<4} {:<20} {:>9} {:<10} {:<8} {:<16}",
            "#", "dest", "name", "price", "depart", "airline", "fare"
        ),
    );
    push_row(
        &mut out,
        format!("{:->3} {:-<4} {:-<20} {:->9} {:-<10} {:-<8} {:-<16}", "", "", "", "", "", "", ""),
    );

    let mut notes = Vec::new();
    for (i, o) in offers.iter().take(top_n).enumerate() {
        let mut fare = o.fare_class_raw.clone().unwrap_or_else(|| "-".to_string());
        if let Some(note) = &o.fare_class_note {
            fare.push('*');
            if !notes.contains(note) {
                notes.push(note.clone());
            }
        }
        push_row(
            &mut out,
            format!(
                "{:>3} {:<4} {:<20} {:>9} {:<10} {:<8} {:<16}",
                i + 1,
                o.destination_code,
                truncate(&o.destination_name, 20),
                format!("${:.0}", o.price),
                o.departure_date,
                truncate(&o.airline, 8),
                truncate(&fare, 16),
            ),
        );
    }

    if offers.len() > top_n {
        out.push_str(&format!("... {} more\n", offers.len() - top_n));
    }
    for note in notes {
        out.push_str(&format!("* {note}\n"));
    }
    if let Some(cheapest) = offers.first() {
        out.push_str(&format!("\nBook the cheapest: {}\n", cheapest.booking_reference));
    }

    out
}

pub fn format_airports(airports: &[&Airport]) -> String {
    let mut out = String::new();
    push_row(&mut out, format!("{:<4} {:<40} {:<20} {:<16}", "code", "airport", "city", "country"));
    push_row(&mut out, format!("{:-<4} {:-<40} {:-<20} {:-<16}", "", "", "", ""));
    for a in airports {
        push_row(
            &mut out,
            format!(
                "{:<4} {:<40} {:<20} {:<16}",
                a.code,
                truncate(a.name, 40),
                truncate(a.city, 20),
                truncate(a.country, 16),
            ),
        );
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
