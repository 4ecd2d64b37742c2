use std::sync::Arc;

use parking_lot::Mutex;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;

use crate::tool::{FlightSearchTool, SearchFlightsArgs, UsageCounter};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ResolveAirportArgs {
    #[schemars(description = "City name or airport code to look up. Examples: Tokyo, san francisco, LHR")]
    query: String,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

#[derive(Debug, Clone)]
struct FarefinderMcp {
    tool_router: ToolRouter<Self>,
    search: Arc<FlightSearchTool>,
    usage: Arc<Mutex<UsageCounter>>,
}

#[tool_router]
impl FarefinderMcp {
    fn new(search: FlightSearchTool) -> Self {
        Self {
            tool_router: Self::tool_router(),
            search: Arc::new(search),
            usage: Arc::new(Mutex::new(UsageCounter::default())),
        }
    }

    #[tool(
        description = "Search flights between two cities or airports. Accepts city names (e.g. New York, Tokyo) or 3-letter airport codes. Returns best and other flight options with airports, times, durations, airlines, stops, prices, price insights and a Google Flights link. On failure returns an object with error, details and suggestions."
    )]
    async fn search_flights(
        &self,
        Parameters(args): Parameters<SearchFlightsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self.search.call_today(&args).await;
        self.usage.lock().record(&outcome);

        let json = outcome.response.to_json();
        if outcome.response.is_error() {
            Ok(CallToolResult::error(vec![Content::text(json)]))
        } else {
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
    }

    #[tool(
        description = "Look up the airport code(s) for a city name. Use this when a city has several airports or when search_flights reports an unknown airport."
    )]
    async fn resolve_airport(
        &self,
        Parameters(args): Parameters<ResolveAirportArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.search.resolver.candidates(&args.query) {
            Some((city, codes)) => {
                let json = serde_json::json!({
                    "query": args.query,
                    "match": city,
                    "code": codes.first(),
                    "airports": codes,
                });
                Ok(CallToolResult::success(vec![Content::text(json.to_string())]))
            }
            None => tool_error(format!(
                "no airport found for \"{}\"; ask the user for a 3-letter airport code",
                args.query
            )),
        }
    }

    #[tool(description = "Number of flight searches sent to the upstream API since this server started.")]
    async fn search_usage(&self) -> Result<CallToolResult, McpError> {
        let searches = self.usage.lock().searches();
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::json!({ "searches": searches }).to_string(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for FarefinderMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "farefinder".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Flight search tool. Call search_flights with city names or airport codes and YYYY-MM-DD dates. If it reports an unknown airport, call resolve_airport or ask the user for the airport code. Present searchUrl so the user can book on Google Flights.".into(),
            ),
        }
    }
}

pub async fn run(search: FlightSearchTool) -> Result<(), Box<dyn std::error::Error>> {
    if !search.config.credential.is_configured() {
        tracing::warn!("starting MCP server without a usable API key; searches will return setup guidance");
    }
    let service = FarefinderMcp::new(search)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;
    Ok(())
}
