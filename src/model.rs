use serde::Serialize;
use serde_json::{Map, Value};

pub type Extra = Map<String, Value>;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub time: String,
}

impl Airport {
    pub fn is_identifiable(&self) -> bool {
        is_known(&self.code) || is_known(&self.name)
    }

    pub fn label(&self) -> &str {
        if is_known(&self.code) {
            &self.code
        } else if is_known(&self.name) {
            &self.name
        } else {
            "?"
        }
    }
}

fn is_known(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s != UNKNOWN
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: Airport,
    pub arrival: Airport,
    pub duration_minutes: Option<u32>,
    pub airline: String,
    pub airline_logo: Option<String>,
    pub flight_number: String,
    pub airplane: Option<String>,
    pub travel_class: Option<String>,
    pub legroom: Option<String>,
    pub overnight: bool,
    pub often_delayed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
}

impl Segment {
    pub fn is_identifiable(&self) -> bool {
        self.departure.is_identifiable() || self.arrival.is_identifiable() || is_known(&self.airline)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layover {
    pub code: String,
    pub name: String,
    pub duration_minutes: Option<u32>,
    pub overnight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEmission {
    pub this_flight_grams: Option<i64>,
    pub typical_grams: Option<i64>,
    pub difference_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOption {
    pub segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layovers: Vec<Layover>,
    pub total_duration_minutes: Option<u32>,
    pub price: Option<i64>,
    pub trip_type: Option<String>,
    pub airline_logo: Option<String>,
    pub carbon: CarbonEmission,
    pub booking_token: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
    // Flat option-level fields that sat beside nested segments.
    #[serde(skip)]
    pub legacy: Option<Segment>,
}

impl FlightOption {
    /// True when the first segment or the legacy flat fields name an airport or airline.
    pub fn is_identifiable(&self) -> bool {
        self.segments.first().is_some_and(Segment::is_identifiable)
            || self.legacy.as_ref().is_some_and(Segment::is_identifiable)
    }

    pub fn departure(&self) -> Option<&Airport> {
        self.segments.first().map(|s| &s.departure)
    }

    pub fn arrival(&self) -> Option<&Airport> {
        self.segments.last().map(|s| &s.arrival)
    }

    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    pub fn airlines(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            let name = seg.airline.as_str();
            if is_known(name) && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        if self.total_duration_minutes.is_some() {
            return self.total_duration_minutes;
        }
        let legs: Vec<u32> = self.segments.iter().filter_map(|s| s.duration_minutes).collect();
        if legs.is_empty() {
            return None;
        }
        let layovers = self.layovers.iter().filter_map(|l| l.duration_minutes);
        Some(legs.into_iter().chain(layovers).fold(0u32, u32::saturating_add))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInsights {
    pub lowest_price: Option<i64>,
    pub price_level: Option<String>,
    pub typical_price_range: Option<(i64, i64)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub price_history: Vec<(i64, i64)>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub best_flights: Vec<FlightOption>,
    pub other_flights: Vec<FlightOption>,
    pub price_insights: Option<PriceInsights>,
    pub search_url: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Extra,
}

impl SearchResult {
    pub fn total_results(&self) -> usize {
        self.best_flights.len() + self.other_flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_results() == 0
    }

    pub fn all_flights(&self) -> impl Iterator<Item = &FlightOption> {
        self.best_flights.iter().chain(self.other_flights.iter())
    }

    /// Keeps the `n` cheapest options of each list; unpriced options sort last.
    pub fn keep_cheapest(&mut self, n: usize) {
        for list in [&mut self.best_flights, &mut self.other_flights] {
            list.sort_by_key(|f| f.price.unwrap_or(i64::MAX));
            list.truncate(n);
        }
    }
}
