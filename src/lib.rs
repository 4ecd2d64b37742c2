pub mod airport;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mcp;
pub mod model;
pub mod normalize;
pub mod query;
pub mod table;
pub mod tool;

use config::Config;
use error::FlightError;
use fetch::FetchOptions;
use normalize::NormalizedSearch;
use query::SearchRequest;

pub async fn search(
    request: &SearchRequest,
    config: &Config,
    options: &FetchOptions,
) -> Result<NormalizedSearch, FlightError> {
    let api_key = config.api_key()?;

    tracing::debug!(params = ?request.to_url_params(), "searching flights");
    let params = request.to_url_params_with_key(api_key);
    let body = fetch::fetch_json(&config.base_url, &params, options).await?;

    let mut search = normalize::normalize(&body).into_search()?;
    if search.result.search_url.is_none() {
        search.result.search_url = Some(request.browser_url());
    }

    tracing::info!(
        origin = %request.origin,
        destination = %request.destination,
        best = search.result.best_flights.len(),
        other = search.result.other_flights.len(),
        degraded = search.degraded,
        "flight search complete"
    );
    Ok(search)
}
