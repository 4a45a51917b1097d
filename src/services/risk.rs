// src/services/risk.rs
use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::models::{PricePoint, RiskAnalysis, RiskLevel, Trend};

const TRADING_DAYS: f64 = 252.0;
const LOW_VOLATILITY: f64 = 20.0;
const MEDIUM_VOLATILITY: f64 = 35.0;
const SHORT_WINDOW: usize = 20;
const LONG_WINDOW: usize = 50;
const TREND_BAND: f64 = 0.01;
const MIN_CORRELATION_POINTS: usize = 20;

fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn calculate_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = calculate_mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Daily returns keyed by date, each return attributed to the later day.
fn dated_returns(prices: &[PricePoint]) -> BTreeMap<String, f64> {
    prices
        .windows(2)
        .filter(|w| w[0].close > 0.0)
        .map(|w| (w[1].date.clone(), w[1].close / w[0].close - 1.0))
        .collect()
}

fn simple_moving_average(closes: &[f64], window: usize) -> f64 {
    let start = closes.len().saturating_sub(window);
    calculate_mean(&closes[start..])
}

pub fn classify_volatility(annualized_pct: f64) -> RiskLevel {
    if annualized_pct < LOW_VOLATILITY {
        RiskLevel::Low
    } else if annualized_pct < MEDIUM_VOLATILITY {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn classify_trend(closes: &[f64]) -> Trend {
    if closes.len() < 2 {
        return Trend::NotAvailable;
    }
    let short = simple_moving_average(closes, SHORT_WINDOW);
    let long = simple_moving_average(closes, LONG_WINDOW);
    if short > long * (1.0 + TREND_BAND) {
        Trend::Uptrend
    } else if short < long * (1.0 - TREND_BAND) {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

/// Equal-weighted daily returns of the portfolio, averaged over the members
/// that traded on each date.
pub fn portfolio_returns(histories: &HashMap<String, Vec<PricePoint>>) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for prices in histories.values() {
        for (date, ret) in dated_returns(prices) {
            let entry = sums.entry(date).or_insert((0.0, 0));
            entry.0 += ret;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let mean_x = calculate_mean(xs);
    let mean_y = calculate_mean(ys);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

pub fn portfolio_correlation(prices: &[PricePoint], portfolio: &BTreeMap<String, f64>) -> Option<f64> {
    let own = dated_returns(prices);
    let (xs, ys): (Vec<f64>, Vec<f64>) = own
        .iter()
        .filter_map(|(date, r)| portfolio.get(date).map(|p| (*r, *p)))
        .unzip();

    if xs.len() < MIN_CORRELATION_POINTS {
        debug!("Only {} overlapping dates with the portfolio, skipping correlation", xs.len());
        return None;
    }
    pearson(&xs, &ys).map(round4)
}

/// Rule-based risk profile from daily closes. `live_price` overrides the last
/// close as the current price when present.
pub fn assess_risk(
    symbol: &str,
    prices: &[PricePoint],
    live_price: Option<f64>,
    portfolio: &BTreeMap<String, f64>,
) -> RiskAnalysis {
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    if closes.len() < 2 {
        warn!("Insufficient price history to assess risk for {}", symbol);
        return RiskAnalysis::unavailable(format!("Insufficient price history for {}", symbol));
    }

    let returns = daily_returns(&closes);
    let volatility = calculate_std_dev(&returns) * TRADING_DAYS.sqrt() * 100.0;
    let latest_close = closes[closes.len() - 1];

    RiskAnalysis {
        risk_level: classify_volatility(volatility),
        volatility: Some(round2(volatility)),
        daily_return: returns.last().map(|r| round2(r * 100.0)),
        current_price: Some(live_price.filter(|p| *p > 0.0).unwrap_or(latest_close)),
        latest_close: Some(latest_close),
        trend: classify_trend(&closes),
        portfolio_correlation: portfolio_correlation(prices, portfolio),
        error: None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint {
                date: format!("2024-{:02}-{:02}", 1 + i / 28, 1 + i % 28),
                close: *c,
            })
            .collect()
    }

    #[test]
    fn flat_series_is_low_risk_and_sideways() {
        let prices = series(&[100.0; 60]);
        let risk = assess_risk("FLAT.NS", &prices, None, &BTreeMap::new());
        assert_eq!(risk.risk_level, RiskLevel::Low);
        assert_eq!(risk.volatility, Some(0.0));
        assert_eq!(risk.daily_return, Some(0.0));
        assert_eq!(risk.trend, Trend::Sideways);
        assert_eq!(risk.current_price, Some(100.0));
        assert!(risk.portfolio_correlation.is_none());
        assert!(risk.is_available());
    }

    #[test]
    fn alternating_moves_are_high_risk() {
        let closes: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 105.0 }).collect();
        let risk = assess_risk("SWING.NS", &series(&closes), Some(104.0), &BTreeMap::new());
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.current_price, Some(104.0));
        assert_eq!(risk.latest_close, Some(105.0));
    }

    #[test]
    fn rising_series_is_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        assert_eq!(classify_trend(&closes), Trend::Uptrend);
        let falling: Vec<f64> = closes.iter().rev().copied().collect();
        assert_eq!(classify_trend(&falling), Trend::Downtrend);
    }

    #[test]
    fn single_close_is_unavailable() {
        let risk = assess_risk("NEW.NS", &series(&[10.0]), None, &BTreeMap::new());
        assert_eq!(risk.risk_level, RiskLevel::NotAvailable);
        assert_eq!(risk.trend, Trend::NotAvailable);
        assert!(risk.error.is_some());
    }

    #[test]
    fn volatility_thresholds() {
        assert_eq!(classify_volatility(12.0), RiskLevel::Low);
        assert_eq!(classify_volatility(20.0), RiskLevel::Medium);
        assert_eq!(classify_volatility(35.0), RiskLevel::High);
    }

    #[test]
    fn correlates_with_portfolio_of_itself() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
        let prices = series(&closes);
        let mut histories = HashMap::new();
        histories.insert("SELF.NS".to_string(), prices.clone());
        let portfolio = portfolio_returns(&histories);
        assert_eq!(portfolio_correlation(&prices, &portfolio), Some(1.0));
    }

    #[test]
    fn portfolio_returns_average_members() {
        let mut histories = HashMap::new();
        histories.insert("A".to_string(), series(&[100.0, 110.0]));
        histories.insert("B".to_string(), series(&[100.0, 90.0]));
        let portfolio = portfolio_returns(&histories);
        assert_eq!(portfolio.len(), 1);
        assert!(portfolio.values().next().unwrap().abs() < 1e-12);
    }
}
