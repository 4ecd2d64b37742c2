use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FlightError;
use crate::model::*;

pub const FALLBACK_LIMIT: usize = 5;

const NO_RESULTS_MARKER: &str = "returned any results";

const TOP_LEVEL_KEYS: &[&str] = &[
    "best_flights",
    "other_flights",
    "price_insights",
    "search_metadata",
    "error",
];

const PRICE_INSIGHT_KEYS: &[&str] = &[
    "lowest_price",
    "price_level",
    "typical_price_range",
    "price_history",
];

const OPTION_KEYS: &[&str] = &[
    "flights",
    "layovers",
    "total_duration",
    "price",
    "type",
    "airline_logo",
    "carbon_emissions",
    "booking_token",
    "departure_airport",
    "arrival_airport",
    "airline",
    "flight_number",
    "duration",
];

const SEGMENT_KEYS: &[&str] = &[
    "departure_airport",
    "arrival_airport",
    "duration",
    "airline",
    "airline_logo",
    "flight_number",
    "airplane",
    "travel_class",
    "legroom",
    "overnight",
    "often_delayed_by_over_30_min",
    "extensions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlightList {
    Best,
    Other,
}

impl FlightList {
    fn key(self) -> &'static str {
        match self {
            Self::Best => "best_flights",
            Self::Other => "other_flights",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<FlightList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    fn general(message: impl Into<String>) -> Self {
        Self {
            list: None,
            index: None,
            message: message.into(),
        }
    }

    fn unidentifiable(list: FlightList, index: usize) -> Self {
        Self {
            list: Some(list),
            index: Some(index),
            message: "no departure, arrival or airline information; option dropped".into(),
        }
    }
}

#[derive(Debug)]
pub enum Normalized {
    Valid {
        result: SearchResult,
        diagnostics: Vec<Diagnostic>,
    },
    Degraded {
        result: SearchResult,
        diagnostics: Vec<Diagnostic>,
    },
    Rejected(FlightError),
}

#[derive(Debug, Clone)]
pub struct NormalizedSearch {
    pub result: SearchResult,
    pub diagnostics: Vec<Diagnostic>,
    pub degraded: bool,
}

impl Normalized {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_search(self) -> Result<NormalizedSearch, FlightError> {
        match self {
            Self::Valid {
                result,
                diagnostics,
            } => Ok(NormalizedSearch {
                result,
                diagnostics,
                degraded: false,
            }),
            Self::Degraded {
                result,
                diagnostics,
            } => Ok(NormalizedSearch {
                result,
                diagnostics,
                degraded: true,
            }),
            Self::Rejected(err) => Err(err),
        }
    }
}

// Typed shape. Every field is optional; anything unrecognized lands in `extra`.

#[derive(Debug, Deserialize)]
struct RawResponse {
    best_flights: Option<Vec<RawOption>>,
    other_flights: Option<Vec<RawOption>>,
    price_insights: Option<RawPriceInsights>,
    search_metadata: Option<RawSearchMetadata>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Deserialize)]
struct RawSearchMetadata {
    google_flights_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPriceInsights {
    lowest_price: Option<i64>,
    price_level: Option<String>,
    typical_price_range: Option<Vec<i64>>,
    price_history: Option<Vec<Vec<i64>>>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Default, Deserialize)]
struct RawAirport {
    id: Option<String>,
    name: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    departure_airport: Option<RawAirport>,
    arrival_airport: Option<RawAirport>,
    duration: Option<u32>,
    airline: Option<String>,
    airline_logo: Option<String>,
    flight_number: Option<String>,
    airplane: Option<String>,
    travel_class: Option<String>,
    legroom: Option<String>,
    overnight: Option<bool>,
    often_delayed_by_over_30_min: Option<bool>,
    extensions: Option<Vec<String>>,
    #[serde(flatten)]
    extra: Extra,
}

#[derive(Debug, Deserialize)]
struct RawLayover {
    id: Option<String>,
    name: Option<String>,
    duration: Option<u32>,
    overnight: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawCarbon {
    this_flight: Option<i64>,
    typical_for_this_route: Option<i64>,
    difference_percent: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    flights: Option<Vec<RawSegment>>,
    layovers: Option<Vec<RawLayover>>,
    total_duration: Option<u32>,
    price: Option<i64>,
    #[serde(rename = "type")]
    trip_type: Option<String>,
    airline_logo: Option<String>,
    carbon_emissions: Option<RawCarbon>,
    booking_token: Option<String>,
    departure_airport: Option<RawAirport>,
    arrival_airport: Option<RawAirport>,
    airline: Option<String>,
    flight_number: Option<String>,
    duration: Option<u32>,
    #[serde(flatten)]
    extra: Extra,
}

impl From<RawAirport> for Airport {
    fn from(raw: RawAirport) -> Self {
        Self {
            code: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            time: raw.time.unwrap_or_default(),
        }
    }
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        Self {
            departure: raw.departure_airport.map(Airport::from).unwrap_or_default(),
            arrival: raw.arrival_airport.map(Airport::from).unwrap_or_default(),
            duration_minutes: raw.duration,
            airline: raw.airline.unwrap_or_default(),
            airline_logo: raw.airline_logo,
            flight_number: raw.flight_number.unwrap_or_default(),
            airplane: raw.airplane,
            travel_class: raw.travel_class,
            legroom: raw.legroom,
            overnight: raw.overnight.unwrap_or(false),
            often_delayed: raw.often_delayed_by_over_30_min.unwrap_or(false),
            extensions: raw.extensions.unwrap_or_default(),
            extra: raw.extra,
        }
    }
}

impl From<RawOption> for FlightOption {
    fn from(raw: RawOption) -> Self {
        let flat = Segment {
            departure: raw.departure_airport.map(Airport::from).unwrap_or_default(),
            arrival: raw.arrival_airport.map(Airport::from).unwrap_or_default(),
            duration_minutes: raw.duration,
            airline: raw.airline.unwrap_or_default(),
            flight_number: raw.flight_number.unwrap_or_default(),
            ..Default::default()
        };
        let nested: Vec<Segment> = raw
            .flights
            .unwrap_or_default()
            .into_iter()
            .map(Segment::from)
            .collect();

        let layovers = raw
            .layovers
            .unwrap_or_default()
            .into_iter()
            .map(|l| Layover {
                code: l.id.unwrap_or_default(),
                name: l.name.unwrap_or_default(),
                duration_minutes: l.duration,
                overnight: l.overnight.unwrap_or(false),
            })
            .collect();

        let carbon = raw
            .carbon_emissions
            .map(|c| CarbonEmission {
                this_flight_grams: c.this_flight,
                typical_grams: c.typical_for_this_route,
                difference_percent: c.difference_percent,
            })
            .unwrap_or_default();

        let legacy = legacy_fields(&nested, &flat);
        Self {
            segments: combine_segments(nested, flat),
            layovers,
            total_duration_minutes: raw.total_duration,
            price: raw.price,
            trip_type: raw.trip_type,
            airline_logo: raw.airline_logo,
            carbon,
            booking_token: raw.booking_token,
            extra: raw.extra,
            legacy,
        }
    }
}

impl From<RawPriceInsights> for PriceInsights {
    fn from(raw: RawPriceInsights) -> Self {
        Self {
            lowest_price: raw.lowest_price,
            price_level: raw.price_level,
            typical_price_range: raw.typical_price_range.as_deref().and_then(range_pair),
            price_history: raw
                .price_history
                .unwrap_or_default()
                .iter()
                .filter_map(|p| range_pair(p))
                .collect(),
            extra: raw.extra,
        }
    }
}

fn range_pair(values: &[i64]) -> Option<(i64, i64)> {
    match values {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}

fn fill_airport(target: &mut Airport, source: &Airport) {
    if target.code.is_empty() {
        target.code = source.code.clone();
    }
    if target.name.is_empty() {
        target.name = source.name.clone();
    }
    if target.time.is_empty() {
        target.time = source.time.clone();
    }
}

// Flat fields only count on their own when nested segments exist too.
fn legacy_fields(nested: &[Segment], flat: &Segment) -> Option<Segment> {
    (!nested.is_empty() && flat.is_identifiable()).then(|| flat.clone())
}

/// Nested segments win; flat legacy fields only fill what they leave empty.
fn combine_segments(mut nested: Vec<Segment>, flat: Segment) -> Vec<Segment> {
    if nested.is_empty() {
        return vec![flat];
    }

    if let Some(first) = nested.first_mut() {
        fill_airport(&mut first.departure, &flat.departure);
        if first.airline.is_empty() {
            first.airline = flat.airline.clone();
        }
        if first.flight_number.is_empty() {
            first.flight_number = flat.flight_number.clone();
        }
    }
    if let Some(last) = nested.last_mut() {
        fill_airport(&mut last.arrival, &flat.arrival);
    }
    if nested.len() == 1 && nested[0].duration_minutes.is_none() {
        nested[0].duration_minutes = flat.duration_minutes;
    }
    nested
}

pub fn prune(list: FlightList, options: Vec<FlightOption>) -> (Vec<FlightOption>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let kept = options
        .into_iter()
        .enumerate()
        .filter_map(|(index, option)| {
            if option.is_identifiable() {
                Some(option)
            } else {
                diagnostics.push(Diagnostic::unidentifiable(list, index));
                None
            }
        })
        .collect();
    (kept, diagnostics)
}

fn upstream_error(value: &Value) -> Option<&str> {
    value.get("error").and_then(Value::as_str)
}

pub fn normalize(body: &str) -> Normalized {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_value(value),
        Err(e) => {
            tracing::error!(error = %e, "flight search response is not JSON");
            Normalized::Rejected(FlightError::InvalidResponse(format!(
                "response is not JSON ({e})"
            )))
        }
    }
}

pub fn normalize_value(value: Value) -> Normalized {
    if let Some(message) = upstream_error(&value) {
        if message.contains(NO_RESULTS_MARKER) {
            tracing::info!(upstream = message, "upstream reported no flights");
            return Normalized::Valid {
                result: SearchResult::default(),
                diagnostics: vec![Diagnostic::general(message)],
            };
        }
        return Normalized::Rejected(FlightError::UpstreamApi(message.to_string()));
    }

    match RawResponse::deserialize(&value) {
        Ok(raw) => {
            let (result, diagnostics) = from_typed(raw);
            if !diagnostics.is_empty() {
                tracing::debug!(dropped = diagnostics.len(), "pruned unidentifiable flight options");
            }
            Normalized::Valid {
                result,
                diagnostics,
            }
        }
        Err(strict_err) => match reconstruct(&value) {
            Some((result, mut diagnostics)) => {
                tracing::warn!(
                    error = %strict_err,
                    kept = result.total_results(),
                    "response failed strict validation; using best-effort reconstruction"
                );
                diagnostics.insert(
                    0,
                    Diagnostic::general(format!("strict validation failed: {strict_err}")),
                );
                Normalized::Degraded {
                    result,
                    diagnostics,
                }
            }
            None => {
                tracing::error!(error = %strict_err, "response could not be reconstructed");
                Normalized::Rejected(FlightError::InvalidResponse(strict_err.to_string()))
            }
        },
    }
}

fn typed_list(
    list: FlightList,
    options: Option<Vec<RawOption>>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<FlightOption> {
    let options = options
        .unwrap_or_default()
        .into_iter()
        .map(FlightOption::from)
        .collect();
    let (kept, dropped) = prune(list, options);
    diagnostics.extend(dropped);
    kept
}

fn from_typed(raw: RawResponse) -> (SearchResult, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let best_flights = typed_list(FlightList::Best, raw.best_flights, &mut diagnostics);
    let other_flights = typed_list(FlightList::Other, raw.other_flights, &mut diagnostics);

    let result = SearchResult {
        best_flights,
        other_flights,
        price_insights: raw.price_insights.map(PriceInsights::from),
        search_url: raw.search_metadata.and_then(|m| m.google_flights_url),
        extra: raw.extra,
    };
    (result, diagnostics)
}

// Best-effort path over untyped JSON.

fn lenient_str(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Reads numbers, numeric strings and money strings like `"$1,234"`.
fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let whole = s.split('.').next().unwrap_or_default();
            let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
            let n: i64 = digits.parse().ok()?;
            Some(if whole.trim_start().starts_with('-') { -n } else { n })
        }
        _ => None,
    }
}

fn lenient_u32(value: Option<&Value>) -> Option<u32> {
    lenient_i64(value).and_then(|n| u32::try_from(n).ok())
}

fn lenient_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn lenient_airport(value: Option<&Value>) -> Airport {
    match value {
        Some(Value::Object(obj)) => Airport {
            code: lenient_str(obj.get("id")).unwrap_or_default(),
            name: lenient_str(obj.get("name")).unwrap_or_default(),
            time: lenient_str(obj.get("time")).unwrap_or_default(),
        },
        Some(Value::String(s)) if crate::airport::is_airport_code(s.trim()) => Airport {
            code: s.trim().to_string(),
            ..Default::default()
        },
        Some(Value::String(s)) => Airport {
            name: s.trim().to_string(),
            ..Default::default()
        },
        _ => Airport::default(),
    }
}

fn unrecognized(obj: &Map<String, Value>, known: &[&str]) -> Extra {
    obj.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn reconstruct_segment(obj: &Map<String, Value>) -> Segment {
    Segment {
        departure: lenient_airport(obj.get("departure_airport")),
        arrival: lenient_airport(obj.get("arrival_airport")),
        duration_minutes: lenient_u32(obj.get("duration")),
        airline: lenient_str(obj.get("airline")).unwrap_or_default(),
        airline_logo: lenient_str(obj.get("airline_logo")),
        flight_number: lenient_str(obj.get("flight_number")).unwrap_or_default(),
        airplane: lenient_str(obj.get("airplane")),
        travel_class: lenient_str(obj.get("travel_class")),
        legroom: lenient_str(obj.get("legroom")),
        overnight: lenient_bool(obj.get("overnight")),
        often_delayed: lenient_bool(obj.get("often_delayed_by_over_30_min")),
        extensions: obj
            .get("extensions")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| lenient_str(Some(v))).collect())
            .unwrap_or_default(),
        extra: unrecognized(obj, SEGMENT_KEYS),
    }
}

fn reconstruct_option(obj: &Map<String, Value>) -> FlightOption {
    let flat = Segment {
        departure: lenient_airport(obj.get("departure_airport")),
        arrival: lenient_airport(obj.get("arrival_airport")),
        duration_minutes: lenient_u32(obj.get("duration")),
        airline: lenient_str(obj.get("airline")).unwrap_or_default(),
        flight_number: lenient_str(obj.get("flight_number")).unwrap_or_default(),
        ..Default::default()
    };
    let nested: Vec<Segment> = obj
        .get("flights")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .map(reconstruct_segment)
                .collect()
        })
        .unwrap_or_default();

    let layovers = obj
        .get("layovers")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .map(|l| Layover {
                    code: lenient_str(l.get("id")).unwrap_or_default(),
                    name: lenient_str(l.get("name")).unwrap_or_default(),
                    duration_minutes: lenient_u32(l.get("duration")),
                    overnight: lenient_bool(l.get("overnight")),
                })
                .collect()
        })
        .unwrap_or_default();

    let carbon = obj.get("carbon_emissions");
    let legacy = legacy_fields(&nested, &flat);
    FlightOption {
        segments: combine_segments(nested, flat),
        layovers,
        total_duration_minutes: lenient_u32(obj.get("total_duration")),
        price: lenient_i64(obj.get("price")),
        trip_type: lenient_str(obj.get("type")),
        airline_logo: lenient_str(obj.get("airline_logo")),
        carbon: CarbonEmission {
            this_flight_grams: lenient_i64(carbon.and_then(|c| c.get("this_flight"))),
            typical_grams: lenient_i64(carbon.and_then(|c| c.get("typical_for_this_route"))),
            difference_percent: lenient_i64(carbon.and_then(|c| c.get("difference_percent"))),
        },
        booking_token: lenient_str(obj.get("booking_token")),
        extra: unrecognized(obj, OPTION_KEYS),
        legacy,
    }
}

fn apply_defaults(option: &mut FlightOption) {
    for seg in &mut option.segments {
        for airport in [&mut seg.departure, &mut seg.arrival] {
            if airport.code.is_empty() {
                airport.code = UNKNOWN.to_string();
            }
            if airport.name.is_empty() {
                airport.name = UNKNOWN.to_string();
            }
        }
        if seg.airline.is_empty() {
            seg.airline = UNKNOWN.to_string();
        }
        if seg.flight_number.is_empty() {
            seg.flight_number = UNKNOWN.to_string();
        }
    }
}

fn reconstruct_list(
    list: FlightList,
    items: &[Value],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<FlightOption> {
    let mut kept = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if kept.len() == FALLBACK_LIMIT {
            diagnostics.push(Diagnostic {
                list: Some(list),
                index: Some(index),
                message: format!(
                    "{} more option(s) skipped; reconstruction keeps {FALLBACK_LIMIT} per list",
                    items.len() - index
                ),
            });
            break;
        }

        let Some(obj) = item.as_object() else {
            diagnostics.push(Diagnostic {
                list: Some(list),
                index: Some(index),
                message: "option is not an object; dropped".into(),
            });
            continue;
        };

        let mut option = reconstruct_option(obj);
        if !option.is_identifiable() {
            diagnostics.push(Diagnostic::unidentifiable(list, index));
            continue;
        }
        apply_defaults(&mut option);
        kept.push(option);
    }
    kept
}

fn reconstruct_price_insights(value: Option<&Value>) -> Option<PriceInsights> {
    let obj = value?.as_object()?;
    let pairs = |v: Option<&Value>| -> Vec<(i64, i64)> {
        v.and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|p| {
                        let p = p.as_array()?;
                        Some((lenient_i64(p.first())?, lenient_i64(p.get(1))?))
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    let range = obj.get("typical_price_range").and_then(Value::as_array).and_then(|arr| {
        Some((lenient_i64(arr.first())?, lenient_i64(arr.get(1))?))
    });

    Some(PriceInsights {
        lowest_price: lenient_i64(obj.get("lowest_price")),
        price_level: lenient_str(obj.get("price_level")),
        typical_price_range: range,
        price_history: pairs(obj.get("price_history")),
        extra: unrecognized(obj, PRICE_INSIGHT_KEYS),
    })
}

fn reconstruct(value: &Value) -> Option<(SearchResult, Vec<Diagnostic>)> {
    let obj = value.as_object()?;
    let best = obj.get(FlightList::Best.key()).and_then(Value::as_array);
    let other = obj.get(FlightList::Other.key()).and_then(Value::as_array);
    if best.is_none() && other.is_none() {
        return None;
    }

    let mut diagnostics = Vec::new();
    let best_flights = best
        .map(|items| reconstruct_list(FlightList::Best, items, &mut diagnostics))
        .unwrap_or_default();
    let other_flights = other
        .map(|items| reconstruct_list(FlightList::Other, items, &mut diagnostics))
        .unwrap_or_default();

    let search_url = obj
        .get("search_metadata")
        .and_then(|m| lenient_str(m.get("google_flights_url")));

    let result = SearchResult {
        best_flights,
        other_flights,
        price_insights: reconstruct_price_insights(obj.get("price_insights")),
        search_url,
        extra: unrecognized(obj, TOP_LEVEL_KEYS),
    };
    Some((result, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_numbers() {
        assert_eq!(lenient_i64(Some(&json!("$1,234"))), Some(1234));
        assert_eq!(lenient_i64(Some(&json!("845.60"))), Some(845));
        assert_eq!(lenient_i64(Some(&json!(412.7))), Some(413));
        assert_eq!(lenient_i64(Some(&json!("n/a"))), None);
        assert_eq!(lenient_u32(Some(&json!(-5))), None);
        assert_eq!(lenient_u32(Some(&json!("95"))), Some(95));
    }

    #[test]
    fn lenient_airport_from_string() {
        let a = lenient_airport(Some(&json!("JFK")));
        assert_eq!(a.code, "JFK");
        let b = lenient_airport(Some(&json!("Narita International Airport")));
        assert_eq!(b.name, "Narita International Airport");
        assert!(b.code.is_empty());
    }

    #[test]
    fn nested_segments_take_precedence_over_flat_fields() {
        let flat = Segment {
            departure: Airport {
                code: "LGA".into(),
                name: "LaGuardia".into(),
                time: String::new(),
            },
            airline: "Flat Air".into(),
            ..Default::default()
        };
        let nested = vec![Segment {
            departure: Airport {
                code: "JFK".into(),
                ..Default::default()
            },
            ..Default::default()
        }];
        let combined = combine_segments(nested, flat);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].departure.code, "JFK");
        assert_eq!(combined[0].departure.name, "LaGuardia");
        assert_eq!(combined[0].airline, "Flat Air");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let outcome = normalize_value(json!([1, 2, 3]));
        assert!(matches!(
            outcome,
            Normalized::Rejected(FlightError::InvalidResponse(_))
        ));
    }
}
