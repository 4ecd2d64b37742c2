use std::env;

use crate::error::FlightError;

pub const API_KEY_VAR: &str = "SERPAPI_API_KEY";
pub const BASE_URL_VAR: &str = "FAREFINDER_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com/search.json";

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(String),
    Missing,
    Placeholder,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured(_) => write!(f, "Configured(<redacted>)"),
            Self::Missing => write!(f, "Missing"),
            Self::Placeholder => write!(f, "Placeholder"),
        }
    }
}

impl Credential {
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(v) if is_placeholder(v) => Self::Placeholder,
            Some(v) => Self::Configured(v.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("your")
        || (lower.starts_with('<') && lower.ends_with('>'))
        || lower.contains("placeholder")
        || lower.contains("changeme")
        || lower.contains("api_key_here")
        || lower.chars().all(|c| c == 'x' || c == '*' || c == '.')
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub base_url: String,
}

impl Config {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let credential = Credential::from_value(env::var(API_KEY_VAR).ok().as_deref());
        let base_url = env::var(BASE_URL_VAR)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if credential.is_configured() {
            tracing::debug!(%base_url, "flight search API key loaded");
        } else {
            tracing::warn!(
                state = ?credential,
                "{} is not usable; searches will report a configuration error",
                API_KEY_VAR
            );
        }

        Self {
            credential,
            base_url,
        }
    }

    pub fn api_key(&self) -> Result<&str, FlightError> {
        match &self.credential {
            Credential::Configured(key) => Ok(key),
            other => Err(FlightError::not_configured(other).unwrap_or(FlightError::MissingApiKey)),
        }
    }
}
