//! Static IATA airport directory.
//!
//! Used for CLI autocompletion and to name destinations the pricing API
//! returns without a label.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
}

const fn ap(code: &'static str, name: &'static str, city: &'static str, country: &'static str) -> Airport {
    Airport {
        code,
        name,
        city,
        country,
    }
}

pub const AIRPORTS: &[Airport] = &[
    ap("ATL", "Hartsfield-Jackson Atlanta International", "Atlanta", "United States"),
    ap("LAX", "Los Angeles International", "Los Angeles", "United States"),
    ap("ORD", "O'Hare International", "Chicago", "United States"),
    ap("DFW", "Dallas/Fort Worth International", "Dallas", "United States"),
    ap("DEN", "Denver International", "Denver", "United States"),
    ap("JFK", "John F. Kennedy International", "New York", "United States"),
    ap("SFO", "San Francisco International", "San Francisco", "United States"),
    ap("SEA", "Seattle-Tacoma International", "Seattle", "United States"),
    ap("LAS", "Harry Reid International", "Las Vegas", "United States"),
    ap("MIA", "Miami International", "Miami", "United States"),
    ap("CLT", "Charlotte Douglas International", "Charlotte", "United States"),
    ap("PHX", "Phoenix Sky Harbor International", "Phoenix", "United States"),
    ap("EWR", "Newark Liberty International", "Newark", "United States"),
    ap("IAH", "George Bush Intercontinental", "Houston", "United States"),
    ap("MCO", "Orlando International", "Orlando", "United States"),
    ap("MSP", "Minneapolis-Saint Paul International", "Minneapolis", "United States"),
    ap("DTW", "Detroit Metropolitan", "Detroit", "United States"),
    ap("PHL", "Philadelphia International", "Philadelphia", "United States"),
    ap("LGA", "LaGuardia", "New York", "United States"),
    ap("BWI", "Baltimore/Washington International", "Baltimore", "United States"),
    ap("SLC", "Salt Lake City International", "Salt Lake City", "United States"),
    ap("DCA", "Ronald Reagan Washington National", "Washington", "United States"),
    ap("MDW", "Chicago Midway International", "Chicago", "United States"),
    ap("HNL", "Daniel K. Inouye International", "Honolulu", "United States"),
    ap("BOS", "Logan International", "Boston", "United States"),
    ap("FLL", "Fort Lauderdale-Hollywood International", "Fort Lauderdale", "United States"),
    ap("IAD", "Washington Dulles International", "Washington", "United States"),
    ap("SAN", "San Diego International", "San Diego", "United States"),
    ap("TPA", "Tampa International", "Tampa", "United States"),
    ap("AUS", "Austin-Bergstrom International", "Austin", "United States"),
    ap("YYZ", "Toronto Pearson International", "Toronto", "Canada"),
    ap("YVR", "Vancouver International", "Vancouver", "Canada"),
    ap("YUL", "Montréal-Trudeau International", "Montreal", "Canada"),
    ap("MEX", "Mexico City International", "Mexico City", "Mexico"),
    ap("CUN", "Cancún International", "Cancún", "Mexico"),
    ap("LHR", "Heathrow", "London", "United Kingdom"),
    ap("LGW", "Gatwick", "London", "United Kingdom"),
    ap("CDG", "Charles de Gaulle", "Paris", "France"),
    ap("AMS", "Schiphol", "Amsterdam", "Netherlands"),
    ap("FRA", "Frankfurt am Main", "Frankfurt", "Germany"),
    ap("MUC", "Munich", "Munich", "Germany"),
    ap("BER", "Berlin Brandenburg", "Berlin", "Germany"),
    ap("MAD", "Adolfo Suárez Madrid-Barajas", "Madrid", "Spain"),
    ap("BCN", "Josep Tarradellas Barcelona-El Prat", "Barcelona", "Spain"),
    ap("FCO", "Leonardo da Vinci-Fiumicino", "Rome", "Italy"),
    ap("DUB", "Dublin", "Dublin", "Ireland"),
    ap("LIS", "Humberto Delgado", "Lisbon", "Portugal"),
    ap("IST", "Istanbul", "Istanbul", "Turkey"),
    ap("DXB", "Dubai International", "Dubai", "United Arab Emirates"),
    ap("DOH", "Hamad International", "Doha", "Qatar"),
    ap("NRT", "Narita International", "Tokyo", "Japan"),
    ap("HND", "Haneda", "Tokyo", "Japan"),
    ap("ICN", "Incheon International", "Seoul", "South Korea"),
    ap("SIN", "Changi", "Singapore", "Singapore"),
    ap("HKG", "Hong Kong International", "Hong Kong", "Hong Kong"),
    ap("SYD", "Kingsford Smith", "Sydney", "Australia"),
    ap("GRU", "São Paulo/Guarulhos International", "São Paulo", "Brazil"),
    ap("BOG", "El Dorado International", "Bogotá", "Colombia"),
    ap("SJU", "Luis Muñoz Marín International", "San Juan", "Puerto Rico"),
];

/// Exact lookup by IATA code (case-insensitive).
pub fn find_airport(code: &str) -> Option<&'static Airport> {
    let code = code.trim();
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

/// Autocomplete over the directory.
///
/// Code-prefix matches rank first, then city or name substring matches;
/// within each group the directory order is kept.
pub fn search_airports(query: &str, limit: usize) -> Vec<&'static Airport> {
    let q = query.trim().to_lowercase();
    if q.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut by_code = Vec::new();
    let mut by_text = Vec::new();
    for airport in AIRPORTS {
        if airport.code.to_lowercase().starts_with(&q) {
            by_code.push(airport);
        } else if airport.city.to_lowercase().contains(&q) || airport.name.to_lowercase().contains(&q) {
            by_text.push(airport);
        }
    }

    by_code.into_iter().chain(by_text).take(limit).collect()
}
