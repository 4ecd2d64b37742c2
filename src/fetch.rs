use std::time::Duration;

use wreq::Client;

use crate::error::{self, FlightError};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(String::from)
}

pub fn classify_status(status: u16, body: &str) -> Result<(), FlightError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(FlightError::Unauthorized(status)),
        429 => Err(FlightError::RateLimited),
        _ => Err(FlightError::HttpStatus {
            status,
            message: error_message(body),
        }),
    }
}

pub async fn fetch_json(
    base_url: &str,
    params: &[(String, String)],
    options: &FetchOptions,
) -> Result<String, FlightError> {
    let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

    if let Some(ref proxy) = options.proxy {
        builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
    }

    let client = builder.build().map_err(error::from_http_error)?;

    let response = client
        .get(base_url)
        .query(params)
        .send()
        .await
        .map_err(error::from_http_error)?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(error::from_http_error)?;

    if let Err(err) = classify_status(status, &body) {
        tracing::warn!(status, error = %err, "flight search request failed");
        return Err(err);
    }

    tracing::debug!(status, bytes = body.len(), "flight search response received");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass() {
        assert!(classify_status(200, "").is_ok());
        assert!(classify_status(204, "").is_ok());
    }

    #[test]
    fn auth_and_quota_statuses() {
        assert!(matches!(
            classify_status(401, ""),
            Err(FlightError::Unauthorized(401))
        ));
        assert!(matches!(classify_status(429, ""), Err(FlightError::RateLimited)));
    }

    #[test]
    fn other_statuses_carry_upstream_message() {
        let err = classify_status(400, r#"{"error":"Missing query `departure_id` parameter."}"#)
            .unwrap_err();
        match err {
            FlightError::HttpStatus { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(
                    message.as_deref(),
                    Some("Missing query `departure_id` parameter.")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            classify_status(502, "<html>bad gateway</html>"),
            Err(FlightError::HttpStatus { status: 502, message: None })
        ));
    }
}
