use std::fmt::Write;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{FlightOption, PriceInsights, SearchResult};

pub fn format_price(price: Option<i64>, currency: &str) -> String {
    let p = match price {
        Some(p) => p,
        None => return "-".to_string(),
    };
    match currency {
        "USD" => format!("${p}"),
        "EUR" => format!("€{p}"),
        "GBP" => format!("£{p}"),
        "JPY" | "CNY" => format!("¥{p}"),
        "KRW" => format!("₩{p}"),
        "INR" => format!("₹{p}"),
        "THB" => format!("฿{p}"),
        _ => format!("{p} {currency}"),
    }
}

pub fn format_duration(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) => format!("{}h {:02}m", m / 60, m % 60),
        None => "-".to_string(),
    }
}

pub fn format_stops(flight: &FlightOption) -> String {
    match flight.stops() {
        0 => "Nonstop".to_string(),
        n => {
            let via: Vec<&str> = flight.segments[..n]
                .iter()
                .map(|s| s.arrival.label())
                .collect();
            format!("{n} ({})", via.join(", "))
        }
    }
}

fn render_list(flights: &[FlightOption], currency: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Airlines", "Route", "Depart", "Arrive", "Duration", "Stops", "Flights", "CO2", "Price",
        ]);

    for flight in flights {
        let route: Vec<String> = flight
            .segments
            .iter()
            .map(|s| format!("{} → {}", s.departure.label(), s.arrival.label()))
            .collect();

        let depart = flight
            .departure()
            .map(|a| a.time.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "-".to_string());
        let arrive = flight
            .arrival()
            .map(|a| a.time.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "-".to_string());

        let numbers: Vec<&str> = flight
            .segments
            .iter()
            .map(|s| s.flight_number.as_str())
            .filter(|n| !n.is_empty())
            .collect();

        let co2 = flight
            .carbon
            .this_flight_grams
            .map(|g| format!("{} kg", g / 1000))
            .unwrap_or_default();

        table.add_row(vec![
            flight.airlines().join(", "),
            route.join("\n"),
            depart,
            arrive,
            format_duration(flight.duration_minutes()),
            format_stops(flight),
            numbers.join(", "),
            co2,
            format_price(flight.price, currency),
        ]);
    }

    table.to_string()
}

pub fn format_insights(insights: &PriceInsights, currency: &str) -> String {
    let mut parts = Vec::new();
    if insights.lowest_price.is_some() {
        parts.push(format!("lowest {}", format_price(insights.lowest_price, currency)));
    }
    if let Some(level) = &insights.price_level {
        parts.push(format!("prices are {level}"));
    }
    if let Some((low, high)) = insights.typical_price_range {
        parts.push(format!(
            "typical {}-{}",
            format_price(Some(low), currency),
            format_price(Some(high), currency)
        ));
    }
    parts.join(", ")
}

pub fn render(result: &SearchResult, currency: &str) -> String {
    let mut out = String::new();

    if !result.best_flights.is_empty() {
        out.push_str("Best flights\n");
        out.push_str(&render_list(&result.best_flights, currency));
        out.push('\n');
    }
    if !result.other_flights.is_empty() {
        out.push_str("Other flights\n");
        out.push_str(&render_list(&result.other_flights, currency));
        out.push('\n');
    }
    if let Some(insights) = &result.price_insights {
        let line = format_insights(insights, currency);
        if !line.is_empty() {
            let _ = writeln!(out, "Price insights: {line}");
        }
    }
    if let Some(url) = &result.search_url {
        let _ = writeln!(out, "Google Flights: {url}");
    }

    out
}
