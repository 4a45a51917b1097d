// src/config.rs
use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use log::warn;

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3030";

const DEFAULT_PORTFOLIO: [&str; 9] = [
    "TCS.NS",
    "ITC.NS",
    "ZOMATO.NS",
    "TATASTEEL.NS",
    "INFY.NS",
    "RELIANCE.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "SBIN.NS",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub production: bool,
    pub fmp_api_key: String,
    pub fmp_base_url: String,
    pub yahoo_base_url: String,
    pub request_timeout: Duration,
    pub default_exchange_suffix: String,
    pub portfolio: Vec<String>,
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3030,
            production: false,
            fmp_api_key: String::new(),
            fmp_base_url: DEFAULT_FMP_BASE_URL.to_string(),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            default_exchange_suffix: ".NS".to_string(),
            portfolio: DEFAULT_PORTFOLIO.iter().map(|s| s.to_string()).collect(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        config.production = get("APP_ENV").map(|v| v == "production").unwrap_or(false);

        config.host = match get("HOST") {
            Some(host) => host.parse().map_err(|_| ConfigError {
                key: "HOST",
                message: format!("'{}' is not an IP address", host),
            })?,
            None if config.production => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            None => config.host,
        };

        if let Some(port) = get("PORT") {
            config.port = port.parse().map_err(|_| ConfigError {
                key: "PORT",
                message: format!("'{}' is not a port number", port),
            })?;
        }

        match get("FMP_API_KEY") {
            Some(key) => config.fmp_api_key = key,
            None => warn!("FMP_API_KEY not set, news and search requests will be unauthenticated"),
        }

        if let Some(url) = get("FMP_BASE_URL") {
            config.fmp_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("YAHOO_BASE_URL") {
            config.yahoo_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("API_BASE") {
            config.api_base = url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError {
                key: "REQUEST_TIMEOUT_SECS",
                message: format!("'{}' is not a number of seconds", secs),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(suffix) = get("DEFAULT_EXCHANGE_SUFFIX") {
            config.default_exchange_suffix = suffix.to_uppercase();
        }

        if let Some(list) = get("PORTFOLIO") {
            config.portfolio = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }
}
