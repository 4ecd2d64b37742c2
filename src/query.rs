use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::airport::is_airport_code;
use crate::error::FlightError;

pub const ENGINE: &str = "google_flights";
const MAX_PASSENGERS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants_in_seat: u32,
    pub infants_on_lap: u32,
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants_in_seat: 0,
            infants_on_lap: 0,
        }
    }
}

impl Passengers {
    pub fn total(&self) -> u64 {
        [self.adults, self.children, self.infants_in_seat, self.infants_on_lap]
            .into_iter()
            .map(u64::from)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    pub fn from_str_loose(s: &str) -> Result<Self, FlightError> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "economy" => Ok(Self::Economy),
            "premium_economy" => Ok(Self::PremiumEconomy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(FlightError::InvalidTravelClass(s.to_string())),
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Economy => 1,
            Self::PremiumEconomy => 2,
            Self::Business => 3,
            Self::First => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    RoundTrip,
    OneWay,
}

impl TripType {
    pub fn code(self) -> u8 {
        match self {
            Self::RoundTrip => 1,
            Self::OneWay => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub infants_in_seat: Option<u32>,
    pub infants_on_lap: Option<u32>,
    pub travel_class: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: Passengers,
    pub travel_class: Option<TravelClass>,
    pub currency: String,
    pub language: String,
}

fn validate_airport(code: &str) -> Result<String, FlightError> {
    let code = code.trim();
    if !is_airport_code(code) {
        return Err(FlightError::InvalidAirport(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

fn is_strict_date_format(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

pub fn parse_date(date: &str) -> Result<NaiveDate, FlightError> {
    if !is_strict_date_format(date) {
        return Err(FlightError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| FlightError::InvalidDate(date.to_string()))
}

fn parse_future_date(date: &str, today: NaiveDate) -> Result<NaiveDate, FlightError> {
    let parsed = parse_date(date)?;
    if parsed < today {
        return Err(FlightError::DateInPast(date.to_string()));
    }
    Ok(parsed)
}

impl Passengers {
    fn from_input(input: &SearchInput) -> Self {
        Self {
            adults: input.adults.filter(|&n| n > 0).unwrap_or(1),
            children: input.children.unwrap_or(0),
            infants_in_seat: input.infants_in_seat.unwrap_or(0),
            infants_on_lap: input.infants_on_lap.unwrap_or(0),
        }
    }

    fn validate(&self) -> Result<(), FlightError> {
        let total = self.total();
        if total > u64::from(MAX_PASSENGERS) {
            return Err(FlightError::Validation(format!(
                "total passengers ({total}) exceeds maximum of {MAX_PASSENGERS}"
            )));
        }

        if self.infants_on_lap > self.adults {
            return Err(FlightError::Validation(
                "infants on lap cannot exceed number of adults".into(),
            ));
        }

        Ok(())
    }
}

impl SearchRequest {
    pub fn build(input: &SearchInput, today: NaiveDate) -> Result<Self, FlightError> {
        let origin = validate_airport(&input.origin)?;
        let destination = validate_airport(&input.destination)?;
        if origin == destination {
            return Err(FlightError::Validation(format!(
                "origin and destination are both {origin}"
            )));
        }

        let departure_date = parse_future_date(&input.departure_date, today)?;
        let return_date = match input.return_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let ret = parse_future_date(raw, today)?;
                if ret <= departure_date {
                    return Err(FlightError::ReturnBeforeDeparture {
                        departure: input.departure_date.clone(),
                        return_date: raw.to_string(),
                    });
                }
                Some(ret)
            }
        };

        let passengers = Passengers::from_input(input);
        passengers.validate()?;

        let travel_class = input
            .travel_class
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(TravelClass::from_str_loose)
            .transpose()?;

        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date,
            passengers,
            travel_class,
            currency: input
                .currency
                .as_deref()
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "USD".into()),
            language: input
                .language
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "en".into()),
        })
    }

    pub fn trip_type(&self) -> TripType {
        if self.return_date.is_some() {
            TripType::RoundTrip
        } else {
            TripType::OneWay
        }
    }

    pub fn travel_class_or_default(&self) -> TravelClass {
        self.travel_class.unwrap_or(TravelClass::Economy)
    }

    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("engine".to_string(), ENGINE.to_string()),
            ("departure_id".to_string(), self.origin.clone()),
            ("arrival_id".to_string(), self.destination.clone()),
            ("outbound_date".to_string(), self.departure_date.to_string()),
        ];

        if let Some(ret) = self.return_date {
            params.push(("return_date".to_string(), ret.to_string()));
        }
        params.push(("type".to_string(), self.trip_type().code().to_string()));

        if let Some(class) = self.travel_class {
            params.push(("travel_class".to_string(), class.ordinal().to_string()));
        }

        let p = &self.passengers;
        if p.adults > 1 {
            params.push(("adults".to_string(), p.adults.to_string()));
        }
        for (key, count) in [
            ("children", p.children),
            ("infants_in_seat", p.infants_in_seat),
            ("infants_on_lap", p.infants_on_lap),
        ] {
            if count > 0 {
                params.push((key.to_string(), count.to_string()));
            }
        }

        params.push(("currency".to_string(), self.currency.clone()));
        params.push(("hl".to_string(), self.language.clone()));
        params
    }

    pub fn to_url_params_with_key(&self, api_key: &str) -> Vec<(String, String)> {
        let mut params = self.to_url_params();
        params.insert(1, ("api_key".to_string(), api_key.to_string()));
        params
    }

    /// Google Flights link for the same search, used when the upstream omits one.
    pub fn browser_url(&self) -> String {
        let mut q = format!(
            "Flights+to+{}+from+{}+on+{}",
            self.destination, self.origin, self.departure_date
        );
        match self.return_date {
            Some(ret) => {
                let _ = write!(q, "+through+{ret}");
            }
            None => q.push_str("+oneway"),
        }
        format!("https://www.google.com/travel/flights?q={q}&curr={}", self.currency)
    }
}
