// src/services/yahoo.rs
use chrono::DateTime;
use chrono_tz::Asia::Kolkata;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::models::{CurrentQuote, PricePoint, Profile};
use crate::BoxError;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    industry: Option<String>,
    sector: Option<String>,
    country: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
}

/// Relative gap under which a live price and a daily close are taken to be the
/// same quote. Yahoo's bar closes carry float32 noise.
const SAME_PRICE_TOLERANCE: f64 = 1e-4;

/// A year of daily closes plus the live market price when Yahoo reports one.
/// `market_date` is the IST trading date of that live price.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub prices: Vec<PricePoint>,
    pub market_price: Option<f64>,
    pub market_date: Option<String>,
}

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        YahooClient {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_history(&self, symbol: &str) -> Result<History, BoxError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        info!("Fetching one year of daily closes for {}", symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1y"), ("interval", "1d")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("Yahoo chart request for {} failed with HTTP {}", symbol, status).into());
        }

        let body: ChartResponse = resp.json().await?;
        parse_chart(body, symbol)
    }

    pub async fn fetch_profile(&self, symbol: &str) -> Result<Profile, BoxError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        info!("Fetching company profile for {}", symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("modules", "assetProfile,price")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("Yahoo profile request for {} failed with HTTP {}", symbol, status).into());
        }

        let body: SummaryResponse = resp.json().await?;
        parse_summary(body, symbol)
    }
}

fn ist_date(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&Kolkata).format("%Y-%m-%d").to_string())
}

fn describe(error: &YahooError) -> String {
    format!(
        "{}: {}",
        error.code.as_deref().unwrap_or("Error"),
        error.description.as_deref().unwrap_or("no description")
    )
}

fn parse_chart(body: ChartResponse, symbol: &str) -> Result<History, BoxError> {
    if let Some(error) = body.chart.error {
        return Err(format!("Yahoo chart error for {}: {}", symbol, describe(&error)).into());
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| format!("No chart data returned for {}", symbol))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let mut prices = Vec::with_capacity(timestamps.len());
    let mut skipped = 0;
    for (i, &ts) in timestamps.iter().enumerate() {
        let close = match closes.get(i).copied().flatten() {
            Some(c) if c.is_finite() => c,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let date = match ist_date(ts) {
            Some(date) => date,
            None => {
                skipped += 1;
                continue;
            }
        };
        prices.push(PricePoint { date, close });
    }

    if skipped > 0 {
        warn!("Skipped {} of {} daily rows for {} with missing closes", skipped, timestamps.len(), symbol);
    }
    debug!("Parsed {} daily closes for {}", prices.len(), symbol);

    Ok(History {
        prices,
        market_price: result.meta.regular_market_price,
        market_date: result.meta.regular_market_time.and_then(ist_date),
    })
}

fn parse_summary(body: SummaryResponse, symbol: &str) -> Result<Profile, BoxError> {
    if let Some(error) = body.quote_summary.error {
        return Err(format!("Yahoo profile error for {}: {}", symbol, describe(&error)).into());
    }

    let result = body
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| format!("No profile returned for {}", symbol))?;

    let mut profile = Profile::unknown(symbol);
    if let Some(price) = result.price {
        if let Some(name) = price.long_name.or(price.short_name) {
            profile.name = name;
        }
    }
    if let Some(asset) = result.asset_profile {
        if let Some(industry) = asset.industry {
            profile.industry = industry;
        }
        if let Some(sector) = asset.sector {
            profile.sector = sector;
        }
        if let Some(country) = asset.country {
            profile.country = country;
        }
        if let Some(website) = asset.website {
            profile.website = website;
        }
    }
    Ok(profile)
}

/// Derives the headline quote from the daily series. The live price wins over
/// the last close; change is measured against the previous session's close.
///
/// The last bar belongs to the live session when its date matches
/// `market_date`. Without a date, a live price within a relative 1e-4 of the
/// last close is treated as that same bar.
pub fn quote_from_history(prices: &[PricePoint], market_price: Option<f64>, market_date: Option<&str>) -> CurrentQuote {
    let last = match prices.last() {
        Some(p) => p,
        None => {
            return CurrentQuote {
                price: market_price.unwrap_or(0.0),
                ..CurrentQuote::default()
            }
        }
    };
    let before_last = if prices.len() >= 2 {
        prices[prices.len() - 2].close
    } else {
        last.close
    };

    let (price, previous) = match market_price {
        Some(live) => {
            let same_session = match market_date {
                Some(date) => date == last.date,
                None => (live - last.close).abs() <= last.close.abs() * SAME_PRICE_TOLERANCE,
            };
            if same_session {
                (live, before_last)
            } else {
                (live, last.close)
            }
        }
        None => (last.close, before_last),
    };

    let change = price - previous;
    let change_percent = if previous != 0.0 { change / previous * 100.0 } else { 0.0 };

    CurrentQuote {
        price,
        change,
        change_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, close: f64) -> PricePoint {
        PricePoint {
            date: date.to_string(),
            close,
        }
    }

    #[test]
    fn chart_skips_null_closes_and_uses_ist_dates() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart": {"result": [{
                "meta": {"regularMarketPrice": 101.5, "regularMarketTime": 1704267000},
                "timestamp": [1704081600, 1704168000, 1704254400],
                "indicators": {"quote": [{"close": [100.0, null, 102.0]}]}
            }], "error": null}}"#,
        )
        .unwrap();

        let history = parse_chart(body, "TCS.NS").unwrap();
        assert_eq!(history.market_price, Some(101.5));
        assert_eq!(history.market_date.as_deref(), Some("2024-01-03"));
        assert_eq!(history.prices.len(), 2);
        // 1704081600 is 2024-01-01 04:00 UTC, 09:30 in Kolkata
        assert_eq!(history.prices[0].date, "2024-01-01");
        assert_eq!(history.prices[1].close, 102.0);
    }

    #[test]
    fn chart_error_is_reported() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = parse_chart(body, "NOPE.NS").unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn summary_fills_profile() {
        let body: SummaryResponse = serde_json::from_str(
            r#"{"quoteSummary": {"result": [{
                "assetProfile": {"industry": "Information Technology Services", "sector": "Technology", "country": "India", "website": "https://www.tcs.com"},
                "price": {"longName": "Tata Consultancy Services Limited"}
            }], "error": null}}"#,
        )
        .unwrap();
        let profile = parse_summary(body, "TCS.NS").unwrap();
        assert_eq!(profile.name, "Tata Consultancy Services Limited");
        assert_eq!(profile.symbol, "TCS.NS");
        assert_eq!(profile.country, "India");
    }

    #[test]
    fn quote_uses_previous_close() {
        let prices = vec![point("2024-01-01", 100.0), point("2024-01-02", 110.0)];
        let quote = quote_from_history(&prices, None, None);
        assert_eq!(quote.price, 110.0);
        assert!((quote.change - 10.0).abs() < 1e-9);
        assert!((quote.change_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn quote_prefers_live_price() {
        let prices = vec![point("2024-01-01", 100.0), point("2024-01-02", 110.0)];
        let quote = quote_from_history(&prices, Some(99.0), Some("2024-01-03"));
        assert_eq!(quote.price, 99.0);
        assert!((quote.change + 11.0).abs() < 1e-9);
    }

    #[test]
    fn live_price_on_todays_bar_compares_with_yesterday() {
        // Yahoo bar closes are float32; the live price is not.
        let prices = vec![point("2024-05-02", 3800.0), point("2024-05-03", 3855.64990234375)];

        let dated = quote_from_history(&prices, Some(3855.65), Some("2024-05-03"));
        assert_eq!(dated.price, 3855.65);
        assert!((dated.change - 55.65).abs() < 1e-6);
        assert!((dated.change_percent - 55.65 / 3800.0 * 100.0).abs() < 1e-6);

        let undated = quote_from_history(&prices, Some(3855.65), None);
        assert!((undated.change - 55.65).abs() < 1e-6);
    }

    #[test]
    fn live_price_after_last_bar_compares_with_last_close() {
        let prices = vec![point("2024-05-02", 3800.0), point("2024-05-03", 3855.65)];
        let quote = quote_from_history(&prices, Some(3855.70), Some("2024-05-06"));
        assert!((quote.change - 0.05).abs() < 1e-6);
    }

    #[test]
    fn quote_without_history_is_zeroed() {
        let quote = quote_from_history(&[], None, None);
        assert_eq!(quote, CurrentQuote::default());
    }
}
