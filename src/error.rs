use crate::config::Credential;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InvalidParameters,
    UpstreamRequest,
    UpstreamShape,
}

#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("flight search is not configured: SERPAPI_API_KEY is missing")]
    MissingApiKey,

    #[error("flight search is not configured: SERPAPI_API_KEY still holds a placeholder value")]
    PlaceholderApiKey,

    #[error("could not find an airport for \"{0}\"; give a city name or a 3-letter airport code")]
    UnknownAirport(String),

    #[error("invalid airport code \"{0}\": must be exactly 3 letters (e.g. JFK, HEL, NRT)")]
    InvalidAirport(String),

    #[error("invalid date \"{0}\": must be YYYY-MM-DD format (e.g. 2026-03-01)")]
    InvalidDate(String),

    #[error("date {0} is in the past")]
    DateInPast(String),

    #[error("return date {return_date} must be after departure date {departure}")]
    ReturnBeforeDeparture {
        departure: String,
        return_date: String,
    },

    #[error("invalid travel class \"{0}\": expected economy, premium_economy, business or first")]
    InvalidTravelClass(String),

    #[error("{0}")]
    Validation(String),

    #[error("request timed out; the flight search API may be slow or unreachable")]
    Timeout,

    #[error("connection failed; check your internet connection ({0})")]
    ConnectionFailed(String),

    #[error("DNS resolution failed ({0}); check your internet connection")]
    DnsResolution(String),

    #[error("proxy error; check your --proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("TLS/SSL error while contacting the flight search API ({0})")]
    TlsError(String),

    #[error("the flight search API rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("rate limited by the flight search API (HTTP 429); the account quota may be exhausted")]
    RateLimited,

    #[error("unexpected HTTP status {status} from the flight search API{}", detail_suffix(.message))]
    HttpStatus {
        status: u16,
        message: Option<String>,
    },

    #[error("the flight search API reported an error: {0}")]
    UpstreamApi(String),

    #[error("could not read flight data from the response: {0}")]
    InvalidResponse(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl FlightError {
    pub fn not_configured(credential: &Credential) -> Option<Self> {
        match credential {
            Credential::Configured(_) => None,
            Credential::Missing => Some(Self::MissingApiKey),
            Credential::Placeholder => Some(Self::PlaceholderApiKey),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingApiKey | Self::PlaceholderApiKey => ErrorCategory::Configuration,
            Self::UnknownAirport(_)
            | Self::InvalidAirport(_)
            | Self::InvalidDate(_)
            | Self::DateInPast(_)
            | Self::ReturnBeforeDeparture { .. }
            | Self::InvalidTravelClass(_)
            | Self::Validation(_) => ErrorCategory::InvalidParameters,
            Self::Timeout
            | Self::ConnectionFailed(_)
            | Self::DnsResolution(_)
            | Self::ProxyError(_)
            | Self::TlsError(_)
            | Self::Unauthorized(_)
            | Self::RateLimited
            | Self::HttpStatus { .. }
            | Self::UpstreamApi(_) => ErrorCategory::UpstreamRequest,
            Self::InvalidResponse(_) => ErrorCategory::UpstreamShape,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingApiKey | Self::PlaceholderApiKey => "not_configured",
            Self::UnknownAirport(_) => "unknown_airport",
            Self::InvalidAirport(_) => "invalid_airport",
            Self::InvalidDate(_) => "invalid_date",
            Self::DateInPast(_) => "date_in_past",
            Self::ReturnBeforeDeparture { .. } => "invalid_date_order",
            Self::InvalidTravelClass(_) => "invalid_travel_class",
            Self::Validation(_) => "validation_error",
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::DnsResolution(_) => "dns_error",
            Self::ProxyError(_) => "proxy_error",
            Self::TlsError(_) => "tls_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::HttpStatus { .. } => "http_error",
            Self::UpstreamApi(_) => "upstream_error",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Flight search is not configured",
            ErrorCategory::InvalidParameters => "Invalid search parameters",
            ErrorCategory::UpstreamRequest => "Flight search request failed",
            ErrorCategory::UpstreamShape => "Flight search returned unreadable data",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        let lines: &[&str] = match self {
            Self::MissingApiKey | Self::PlaceholderApiKey => &[
                "Create a free account at https://serpapi.com and copy your API key from the dashboard",
                "Set SERPAPI_API_KEY=<your key> in the environment or in a .env file next to the binary",
                "Restart the application so the key is picked up",
            ],
            Self::UnknownAirport(_) => &[
                "Use a 3-letter IATA airport code such as JFK, LHR or NRT",
                "Try the full city name, e.g. \"New York\" instead of an abbreviation",
            ],
            Self::InvalidAirport(_) => &["Airport codes are exactly 3 letters, e.g. JFK"],
            Self::InvalidDate(_) => &["Write dates as YYYY-MM-DD, e.g. 2026-03-01"],
            Self::DateInPast(_) => &["Pick a departure date from today onwards"],
            Self::ReturnBeforeDeparture { .. } => {
                &["The return date must come after the departure date; omit it for a one-way trip"]
            }
            Self::InvalidTravelClass(_) => {
                &["Use one of: economy, premium_economy, business, first"]
            }
            Self::Validation(_) => &["Check the passenger counts and airports and try again"],
            Self::Timeout
            | Self::ConnectionFailed(_)
            | Self::DnsResolution(_)
            | Self::TlsError(_) => &[
                "Check your internet connection",
                "Try the search again in a moment",
            ],
            Self::ProxyError(_) => &["Check the proxy URL, or search without --proxy"],
            Self::Unauthorized(_) => &[
                "Verify SERPAPI_API_KEY against the key shown in your SerpApi dashboard",
            ],
            Self::RateLimited => &[
                "Your SerpApi search quota may be used up; check the account dashboard",
                "Wait a few minutes before searching again",
            ],
            Self::HttpStatus { .. } | Self::UpstreamApi(_) => &[
                "Try the search again in a moment",
                "Try different dates or nearby airports",
            ],
            Self::InvalidResponse(_) => &[
                "The flight search API may have changed its response format",
                "Try the search again, or open the results on Google Flights directly",
            ],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingApiKey | Self::PlaceholderApiKey => 7,
            Self::Timeout
            | Self::ConnectionFailed(_)
            | Self::DnsResolution(_)
            | Self::TlsError(_)
            | Self::ProxyError(_) => 3,
            Self::RateLimited | Self::Unauthorized(_) => 4,
            Self::HttpStatus { .. } | Self::UpstreamApi(_) => 5,
            Self::InvalidResponse(_) => 6,
            _ => 2,
        }
    }
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    FlightError::ConnectionFailed(msg)
}
