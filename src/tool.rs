use chrono::{Local, NaiveDate};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::airport::AirportResolver;
use crate::config::Config;
use crate::error::FlightError;
use crate::fetch::FetchOptions;
use crate::model::{FlightOption, PriceInsights};
use crate::normalize::{Diagnostic, NormalizedSearch};
use crate::query::{Passengers, SearchInput, SearchRequest, TravelClass, TripType};

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFlightsArgs {
    #[schemars(description = "Departure city or 3-letter airport code. Examples: New York, JFK")]
    pub origin: String,
    #[schemars(description = "Arrival city or 3-letter airport code. Examples: Tokyo, NRT")]
    pub destination: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format. Example: 2026-03-01")]
    pub departure_date: String,
    #[schemars(
        description = "Return date in YYYY-MM-DD for a round trip. Must be after the departure date"
    )]
    pub return_date: Option<String>,
    #[schemars(description = "Adult passengers. Default: 1")]
    pub passengers: Option<u32>,
    #[schemars(description = "Child passengers (2-11). Default: 0")]
    pub children: Option<u32>,
    #[schemars(description = "Infants with own seat (under 2). Default: 0")]
    pub infants_in_seat: Option<u32>,
    #[schemars(description = "Infants on adult's lap (under 2). Default: 0")]
    pub infants_on_lap: Option<u32>,
    #[schemars(description = "One of: economy, premium_economy, business, first. Default: economy")]
    pub travel_class: Option<String>,
    #[schemars(description = "Currency code. Examples: USD, EUR, JPY. Default: USD")]
    pub currency: Option<String>,
    #[schemars(description = "Return only the N cheapest options of each list")]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub passengers: Passengers,
    pub travel_class: TravelClass,
    pub trip_type: TripType,
    pub currency: String,
}

impl From<&SearchRequest> for SearchParameters {
    fn from(req: &SearchRequest) -> Self {
        Self {
            origin: req.origin.clone(),
            destination: req.destination.clone(),
            departure_date: req.departure_date.to_string(),
            return_date: req.return_date.map(|d| d.to_string()),
            passengers: req.passengers.clone(),
            travel_class: req.travel_class_or_default(),
            trip_type: req.trip_type(),
            currency: req.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    pub search_parameters: SearchParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_insights: Option<PriceInsights>,
    pub best_flights: Vec<FlightOption>,
    pub other_flights: Vec<FlightOption>,
    pub total_results: usize,
    pub search_url: String,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl From<&FlightError> for ErrorPayload {
    fn from(err: &FlightError) -> Self {
        Self {
            error: err.headline().to_string(),
            kind: err.kind().to_string(),
            details: Some(err.to_string()),
            suggestions: err.suggestions(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Success(Box<SearchPayload>),
    Error(ErrorPayload),
}

impl ToolResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| serialize_failure(&e))
    }
}

fn serialize_failure(err: &dyn std::fmt::Display) -> String {
    serde_json::json!({
        "error": "failed to serialize response",
        "details": err.to_string(),
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub response: ToolResponse,
    pub upstream_called: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageCounter {
    searches: u64,
}

impl UsageCounter {
    pub fn record(&mut self, outcome: &ToolOutcome) {
        if outcome.upstream_called {
            self.searches += 1;
        }
    }

    pub fn searches(&self) -> u64 {
        self.searches
    }
}

#[derive(Debug, Clone)]
pub struct FlightSearchTool {
    pub config: Config,
    pub options: FetchOptions,
    pub resolver: AirportResolver,
}

impl FlightSearchTool {
    pub fn new(config: Config, options: FetchOptions) -> Self {
        Self {
            config,
            options,
            resolver: AirportResolver::default(),
        }
    }

    fn resolve(&self, text: &str) -> Result<String, FlightError> {
        self.resolver
            .resolve(text)
            .ok_or_else(|| FlightError::UnknownAirport(text.trim().to_string()))
    }

    // Configuration, then airports, then dates and passengers.
    pub fn prepare(
        &self,
        args: &SearchFlightsArgs,
        today: NaiveDate,
    ) -> Result<SearchRequest, FlightError> {
        if let Some(err) = FlightError::not_configured(&self.config.credential) {
            return Err(err);
        }

        let input = SearchInput {
            origin: self.resolve(&args.origin)?,
            destination: self.resolve(&args.destination)?,
            departure_date: args.departure_date.trim().to_string(),
            return_date: args.return_date.clone(),
            adults: args.passengers,
            children: args.children,
            infants_in_seat: args.infants_in_seat,
            infants_on_lap: args.infants_on_lap,
            travel_class: args.travel_class.clone(),
            currency: args.currency.clone(),
            language: None,
        };
        SearchRequest::build(&input, today)
    }

    pub async fn call(&self, args: &SearchFlightsArgs, today: NaiveDate) -> ToolOutcome {
        let request = match self.prepare(args, today) {
            Ok(r) => r,
            Err(err) => {
                tracing::info!(kind = err.kind(), error = %err, "search rejected before request");
                return ToolOutcome {
                    response: ToolResponse::Error(ErrorPayload::from(&err)),
                    upstream_called: false,
                };
            }
        };

        let response = match crate::search(&request, &self.config, &self.options).await {
            Ok(search) => ToolResponse::Success(Box::new(build_payload(
                &request,
                search,
                args.max_results,
            ))),
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "flight search failed");
                ToolResponse::Error(ErrorPayload::from(&err))
            }
        };

        ToolOutcome {
            response,
            upstream_called: true,
        }
    }

    pub async fn call_today(&self, args: &SearchFlightsArgs) -> ToolOutcome {
        self.call(args, Local::now().date_naive()).await
    }
}

pub fn build_payload(
    request: &SearchRequest,
    search: NormalizedSearch,
    max_results: Option<usize>,
) -> SearchPayload {
    let mut result = search.result;
    if let Some(n) = max_results {
        result.keep_cheapest(n);
    }

    SearchPayload {
        search_parameters: SearchParameters::from(request),
        total_results: result.total_results(),
        search_url: result
            .search_url
            .clone()
            .unwrap_or_else(|| request.browser_url()),
        price_insights: result.price_insights,
        best_flights: result.best_flights,
        other_flights: result.other_flights,
        degraded: search.degraded,
        diagnostics: search.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_failure_escapes_details() {
        let out = serialize_failure(&r#"bad "value" at \ line 1"#);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "failed to serialize response");
        assert_eq!(value["details"], r#"bad "value" at \ line 1"#);
    }
}
