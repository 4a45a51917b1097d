// src/services/details.rs
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::models::{RiskAnalysis, StockDetails};
use crate::services::risk::assess_risk;
use crate::services::yahoo::{quote_from_history, History};
use crate::services::AppState;
use crate::BoxError;

const NEWS_LIMIT: usize = 5;
const MAX_SYMBOL_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsError {
    InvalidSymbol(String),
    NotFound(String),
    Upstream(String),
}

impl fmt::Display for DetailsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DetailsError::InvalidSymbol(msg) => write!(f, "{}", msg),
            DetailsError::NotFound(symbol) => write!(f, "No market data found for {}", symbol),
            DetailsError::Upstream(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DetailsError {}

/// Percent-decodes a symbol taken from a URL path segment (`M%26M`, `%5ENSEI`).
pub fn decode_symbol(segment: &str) -> Result<String, DetailsError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| DetailsError::InvalidSymbol(format!("Invalid stock symbol: {}", segment)))
}

/// Uppercases and validates a ticker. Symbols without an exchange suffix get
/// `default_suffix` appended; index symbols (`^NSEI`) are left alone.
pub fn normalize_symbol(raw: &str, default_suffix: &str) -> Result<String, DetailsError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(DetailsError::InvalidSymbol("Symbol is required".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN
        || !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&' | '^' | '_'))
    {
        return Err(DetailsError::InvalidSymbol(format!("Invalid stock symbol: {}", raw.trim())));
    }

    if symbol.contains('.') || symbol.starts_with('^') || default_suffix.is_empty() {
        Ok(symbol)
    } else {
        Ok(format!("{}{}", symbol, default_suffix))
    }
}

/// History from the store when fresh, otherwise from Yahoo (and stored).
pub async fn fetch_history_cached(state: &Arc<AppState>, symbol: &str) -> Result<History, BoxError> {
    let now = Utc::now();
    if let Some(prices) = state.store.get_history(symbol, now).await {
        debug!("Using cached history for {}", symbol);
        return Ok(History {
            prices,
            ..History::default()
        });
    }

    let history = state.yahoo.fetch_history(symbol).await?;
    state.store.put_history(symbol, history.prices.clone(), now).await;
    Ok(history)
}

pub async fn get_stock_details(state: &Arc<AppState>, raw_symbol: &str) -> Result<StockDetails, DetailsError> {
    let symbol = normalize_symbol(raw_symbol, &state.config.default_exchange_suffix)?;
    let now = Utc::now();

    if let Some(cached) = state.store.get_details(&symbol, now).await {
        info!("Serving cached details for {}", symbol);
        return Ok(cached);
    }

    info!("Assembling stock details for {}", symbol);
    let (profile, history, news, country_news) = tokio::join!(
        state.yahoo.fetch_profile(&symbol),
        state.yahoo.fetch_history(&symbol),
        state.fmp.stock_news(&symbol, NEWS_LIMIT),
        state.fmp.india_news(NEWS_LIMIT),
    );

    let mut details = StockDetails::empty(&symbol);
    // Only details assembled from every upstream are cached.
    let mut complete = true;

    let profile_found = match profile {
        Ok(profile) => {
            details.profile = profile;
            true
        }
        Err(e) => {
            error!("Profile lookup failed for {}: {}", symbol, e);
            complete = false;
            false
        }
    };

    let history = history.unwrap_or_else(|e| {
        error!("History lookup failed for {}: {}", symbol, e);
        complete = false;
        History::default()
    });

    if !profile_found && history.prices.is_empty() {
        return Err(DetailsError::NotFound(symbol));
    }

    details.current_quote = quote_from_history(&history.prices, history.market_price, history.market_date.as_deref());
    if !history.prices.is_empty() {
        state.store.put_history(&symbol, history.prices.clone(), now).await;
    }

    let news = news.unwrap_or_else(|e| {
        error!("News lookup failed for {}: {}", symbol, e);
        complete = false;
        Vec::new()
    });
    let (news, sentiment) = state.sentiment.analyze(news);
    details.news = news;
    details.sentiment = sentiment;

    let country_news = country_news.unwrap_or_else(|e| {
        error!("India market news lookup failed: {}", e);
        complete = false;
        Vec::new()
    });
    details.country_news = state.sentiment.analyze(country_news).0;

    let portfolio = state.store.portfolio_returns(&state.config.portfolio, &symbol).await;
    details.risk_analysis = Some(assess_risk(&symbol, &history.prices, history.market_price, &portfolio));

    let closes: Vec<f64> = history.prices.iter().map(|p| p.close).collect();
    details.price_prediction = match state.predictor.predict(&closes) {
        Ok(prediction) => Some(prediction),
        Err(e) => {
            warn!("No price prediction for {} ({}): {}", symbol, state.predictor.name(), e);
            None
        }
    };

    details.historical_prices = history.prices;
    if complete {
        state.store.put_details(&symbol, details.clone(), now).await;
    } else {
        warn!("Not caching partial details for {}", symbol);
    }
    Ok(details)
}

pub async fn get_risk_analysis(state: &Arc<AppState>, raw_symbol: &str) -> Result<RiskAnalysis, DetailsError> {
    let symbol = normalize_symbol(raw_symbol, &state.config.default_exchange_suffix)?;
    info!("Analyzing risk for {}", symbol);

    let history = fetch_history_cached(state, &symbol).await.map_err(|e| {
        error!("Risk analysis failed for {}: {}", symbol, e);
        DetailsError::Upstream("Failed to analyze stock risk".to_string())
    })?;

    let portfolio = state.store.portfolio_returns(&state.config.portfolio, &symbol).await;
    Ok(assess_risk(&symbol, &history.prices, history.market_price, &portfolio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_default_suffix() {
        assert_eq!(normalize_symbol(" tcs ", ".NS").unwrap(), "TCS.NS");
        assert_eq!(normalize_symbol("M&M", ".NS").unwrap(), "M&M.NS");
        assert_eq!(normalize_symbol("reliance.bo", ".NS").unwrap(), "RELIANCE.BO");
        assert_eq!(normalize_symbol("^nsei", ".NS").unwrap(), "^NSEI");
        assert_eq!(normalize_symbol("AAPL", "").unwrap(), "AAPL");
    }

    #[test]
    fn decodes_path_segments() {
        assert_eq!(decode_symbol("M%26M").unwrap(), "M&M");
        assert_eq!(decode_symbol("%5Ensei").unwrap(), "^nsei");
        assert_eq!(decode_symbol("TCS").unwrap(), "TCS");
        assert!(matches!(decode_symbol("%FF"), Err(DetailsError::InvalidSymbol(_))));
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert_eq!(
            normalize_symbol("   ", ".NS"),
            Err(DetailsError::InvalidSymbol("Symbol is required".to_string()))
        );
        assert!(matches!(normalize_symbol("TCS;DROP", ".NS"), Err(DetailsError::InvalidSymbol(_))));
        assert!(matches!(
            normalize_symbol("ABCDEFGHIJKLMNOPQRSTUVWXYZ", ".NS"),
            Err(DetailsError::InvalidSymbol(_))
        ));
    }
}
