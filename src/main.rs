use std::process;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use farefinder::airport::AirportResolver;
use farefinder::config::Config;
use farefinder::error::FlightError;
use farefinder::fetch::FetchOptions;
use farefinder::model::SearchResult;
use farefinder::table;
use farefinder::tool::{FlightSearchTool, SearchFlightsArgs};

#[derive(Parser)]
#[command(
    name = "farefinder",
    about = "Search flights by city or airport from the terminal",
    version,
    after_help = "\
Examples:
  farefinder search -f \"New York\" -t Tokyo -d 2026-12-25
  farefinder search -f JFK -t LHR -d 2026-04-01 --return-date 2026-04-10
  farefinder search -f Paris -t Rome -d 2026-05-01 --class business --json --pretty
  farefinder airport \"san francisco\"

Requires SERPAPI_API_KEY in the environment or a .env file."
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Log filter written to stderr (e.g. info, farefinder=debug)"
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search for flights",
        long_about = "Search for flights between two cities or airports.\n\
            City names are resolved to airport codes; 3-letter codes are used as given.",
        after_help = "\
Examples:
  One-way:      farefinder search -f \"New York\" -t Tokyo -d 2026-12-25
  Round-trip:   farefinder search -f LAX -t NRT -d 2026-05-01 --return-date 2026-05-15
  Business:     farefinder search -f HEL -t BKK -d 2026-03-01 --class business
  JSON output:  farefinder search -f HEL -t BCN -d 2026-03-01 --json --pretty"
    )]
    Search(SearchArgs),
    #[command(about = "Show the airport codes a city name resolves to")]
    Airport {
        #[arg(value_name = "QUERY", help = "City name or airport code")]
        query: String,
    },
    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp {
        #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
        timeout: u64,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(
        short, long,
        value_name = "CITY|IATA",
        help = "Departure city or airport code",
        long_help = "Departure city name (e.g. \"New York\") or IATA airport code (e.g. JFK)."
    )]
    from: String,

    #[arg(
        short, long,
        value_name = "CITY|IATA",
        help = "Arrival city or airport code",
        long_help = "Arrival city name (e.g. Tokyo) or IATA airport code (e.g. NRT)."
    )]
    to: String,

    #[arg(
        short, long,
        value_name = "YYYY-MM-DD",
        help = "Departure date",
        long_help = "Departure date in YYYY-MM-DD format. Must not be in the past."
    )]
    date: String,

    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Return date (makes the search round-trip)",
        long_help = "Return date in YYYY-MM-DD format. Must be after the departure date."
    )]
    return_date: Option<String>,

    #[arg(
        long,
        value_name = "CLASS",
        help = "Travel class [economy, premium_economy, business, first]"
    )]
    class: Option<String>,

    #[arg(long, value_name = "N", help = "Number of adult passengers [default: 1]")]
    adults: Option<u32>,

    #[arg(long, value_name = "N", help = "Number of child passengers (2-11)")]
    children: Option<u32>,

    #[arg(long, value_name = "N", help = "Infants with own seat (under 2)")]
    infants_in_seat: Option<u32>,

    #[arg(long, value_name = "N", help = "Infants on adult's lap (under 2)")]
    infants_on_lap: Option<u32>,

    #[arg(long, default_value = "USD", value_name = "CODE", help = "Currency code (e.g. USD, EUR, JPY)")]
    currency: String,

    #[arg(long, value_name = "N", help = "Show only the N cheapest results of each list")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-flight output (recommended for scripts and AI agents)")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[arg(long, help = "Open the results in Google Flights")]
    open: bool,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,
}

impl SearchArgs {
    fn is_json(&self) -> bool {
        self.json || self.pretty
    }

    fn to_tool_args(&self) -> SearchFlightsArgs {
        SearchFlightsArgs {
            origin: self.from.clone(),
            destination: self.to.clone(),
            departure_date: self.date.clone(),
            return_date: self.return_date.clone(),
            passengers: self.adults,
            children: self.children,
            infants_in_seat: self.infants_in_seat,
            infants_on_lap: self.infants_on_lap,
            travel_class: self.class.clone(),
            currency: Some(self.currency.clone()),
            max_results: self.top,
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": err.headline(),
            "kind": err.kind(),
            "details": err.to_string(),
            "suggestions": err.suggestions(),
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
        for hint in err.suggestions() {
            eprintln!("  hint: {hint}");
        }
    }
    process::exit(err.exit_code());
}

fn print_compact(result: &SearchResult, currency: &str) {
    for flight in result.all_flights() {
        let price = table::format_price(flight.price, currency);

        let route: Vec<&str> = std::iter::once(
            flight.departure().map(|a| a.label()).unwrap_or("?"),
        )
        .chain(flight.segments.iter().map(|s| s.arrival.label()))
        .collect();

        let duration = match flight.duration_minutes() {
            Some(m) => format!("{}h{:02}m", m / 60, m % 60),
            None => "-".to_string(),
        };

        let stops = match flight.stops() {
            0 => "nonstop".to_string(),
            n => format!("{n} stop"),
        };

        let times = match (flight.departure(), flight.arrival()) {
            (Some(d), Some(a)) if !d.time.is_empty() => format!("{}>{}", d.time, a.time),
            _ => "-".to_string(),
        };

        println!(
            "{price} | {} | {duration} | {stops} | {} | {times}",
            route.join(">"),
            flight.airlines().join(", ")
        );
    }
}

async fn run_search(args: SearchArgs, config: Config) {
    let json_mode = args.is_json();
    let options = FetchOptions {
        proxy: args.proxy.clone(),
        timeout: args.timeout,
    };
    let tool = FlightSearchTool::new(config, options);
    let tool_args = args.to_tool_args();
    let today = Local::now().date_naive();

    let request = match tool.prepare(&tool_args, today) {
        Ok(r) => r,
        Err(e) => die(&e, json_mode),
    };

    let search = match farefinder::search(&request, &tool.config, &tool.options).await {
        Ok(s) => s,
        Err(e) => die(&e, json_mode),
    };
    if search.degraded {
        eprintln!(
            "warning: the response did not match the expected format; showing what could be recovered"
        );
    }

    let payload = farefinder::tool::build_payload(&request, search, args.top);

    if args.open {
        println!("Opening: {}", payload.search_url);
        if let Err(e) = open::that(&payload.search_url) {
            die(
                &FlightError::Validation(format!("failed to open browser: {e}")),
                json_mode,
            );
        }
        return;
    }

    if json_mode {
        let output = if args.pretty {
            serde_json::to_string_pretty(&payload)
        } else {
            serde_json::to_string(&payload)
        };
        match output {
            Ok(s) => println!("{s}"),
            Err(e) => die(&FlightError::InvalidResponse(e.to_string()), json_mode),
        }
        return;
    }

    let result = SearchResult {
        best_flights: payload.best_flights,
        other_flights: payload.other_flights,
        price_insights: payload.price_insights,
        search_url: Some(payload.search_url),
        extra: Default::default(),
    };

    if result.is_empty() {
        println!("No flights found.");
        return;
    }

    if args.compact {
        print_compact(&result, &request.currency);
    } else {
        print!("{}", table::render(&result, &request.currency));
    }
}

fn run_airport(query: &str) {
    match AirportResolver::default().candidates(query) {
        Some((city, codes)) => println!("{city}: {}", codes.join(", ")),
        None => die(&FlightError::UnknownAirport(query.to_string()), false),
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Airport { query } => run_airport(&query),
        Commands::Search(args) => run_search(args, Config::from_env()).await,
        Commands::Mcp { timeout } => {
            let tool = FlightSearchTool::new(
                Config::from_env(),
                FetchOptions {
                    proxy: None,
                    timeout,
                },
            );
            if let Err(e) = farefinder::mcp::run(tool).await {
                eprintln!("error: MCP server failed: {e}");
                process::exit(1);
            }
        }
    }
}
