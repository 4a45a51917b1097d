// src/client/api.rs
use std::fmt;
use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use serde_json::Value;

use crate::models::StockDetails;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    Network(String),
    Api { status: u16, message: String },
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Api { message, .. } => write!(f, "{}", message),
            ClientError::Decode(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

#[derive(Clone)]
pub struct DashboardClient {
    http: Client,
    api_base: String,
}

impl DashboardClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(DashboardClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_details(&self, symbol: &str) -> Result<StockDetails, ClientError> {
        let url = details_url(&self.api_base, symbol);
        info!("Requesting stock details from {}", url);

        let resp = self.http.get(&url).send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ClientError::Network(e.to_string())
        })?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        debug!("Received HTTP {} with {} bytes", status, body.len());

        parse_details(status, &body)
    }
}

fn details_url(api_base: &str, symbol: &str) -> String {
    format!("{}/stocks/details/{}", api_base, urlencoding::encode(symbol.trim()))
}

/// Any non-2xx status or an `error` field in the payload is a failure;
/// everything else is decoded leniently.
pub fn parse_details(status: u16, body: &str) -> Result<StockDetails, ClientError> {
    let value: Option<Value> = serde_json::from_str(body).ok();
    let error_message = value
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.as_str())
        .map(str::to_string);

    if !(200..300).contains(&status) {
        return Err(ClientError::Api {
            status,
            message: error_message.unwrap_or_else(|| format!("Request failed with HTTP {}", status)),
        });
    }
    if let Some(message) = error_message {
        return Err(ClientError::Api { status, message });
    }

    let value = value.ok_or_else(|| ClientError::Decode("body is not JSON".to_string()))?;
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_encoded_into_the_path() {
        assert_eq!(
            details_url("http://localhost:3030", " M&M "),
            "http://localhost:3030/stocks/details/M%26M"
        );
        assert_eq!(details_url("http://api", "^NSEI"), "http://api/stocks/details/%5ENSEI");
    }

    #[test]
    fn non_success_status_uses_error_field() {
        let err = parse_details(404, r#"{"error": "No market data found for XYZ.NS"}"#).unwrap_err();
        assert_eq!(
            err,
            ClientError::Api {
                status: 404,
                message: "No market data found for XYZ.NS".to_string()
            }
        );
    }

    #[test]
    fn non_success_without_body() {
        let err = parse_details(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "Request failed with HTTP 502");
    }

    #[test]
    fn error_field_fails_even_with_ok_status() {
        let err = parse_details(200, r#"{"error": "Failed to retrieve complete stock data", "historical_prices": []}"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 200, .. }));
    }

    #[test]
    fn lenient_decode() {
        let details = parse_details(200, r#"{"profile": {"name": "Infosys Limited"}, "sentiment": {"overall_prediction": 62.5}}"#)
            .unwrap();
        assert_eq!(details.profile.name, "Infosys Limited");
        assert_eq!(details.sentiment.unwrap().overall_prediction, 62.5);
        assert!(details.risk_analysis.is_none());
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse_details(200, "<html>"), Err(ClientError::Decode(_))));
    }
}
