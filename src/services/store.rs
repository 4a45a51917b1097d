// src/services/store.rs
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Asia::Kolkata;
use tokio::sync::RwLock;

use crate::models::{PricePoint, StockDetails};
use crate::services::risk::portfolio_returns;

#[derive(Debug, Clone)]
struct Cached<T> {
    fetched_at: DateTime<Utc>,
    value: T,
}

/// True between 09:15 and 15:30 IST on weekdays. Exchange holidays are not
/// modelled.
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    let ist = now.with_timezone(&Kolkata);
    if matches!(ist.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let open = NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default();
    let close = NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default();
    let time = ist.time();
    time >= open && time < close
}

/// Histories outlive the TTL so the portfolio keeps a lagging member, but
/// anything older than this is dropped on the next write.
const HISTORY_RETENTION_DAYS: i64 = 1;

pub fn cache_ttl(now: DateTime<Utc>) -> Duration {
    if is_market_open(now) {
        Duration::minutes(15)
    } else {
        Duration::hours(6)
    }
}

/// In-memory cache of assembled details and raw daily histories.
#[derive(Default)]
pub struct MarketStore {
    details: RwLock<HashMap<String, Cached<StockDetails>>>,
    histories: RwLock<HashMap<String, Cached<Vec<PricePoint>>>>,
}

impl MarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_details(&self, symbol: &str, now: DateTime<Utc>) -> Option<StockDetails> {
        let details = self.details.read().await;
        details
            .get(symbol)
            .filter(|c| c.fetched_at > now - cache_ttl(now))
            .map(|c| c.value.clone())
    }

    pub async fn put_details(&self, symbol: &str, value: StockDetails, now: DateTime<Utc>) {
        let cutoff = now - cache_ttl(now);
        let mut details = self.details.write().await;
        details.retain(|_, c| c.fetched_at > cutoff);
        details.insert(
            symbol.to_string(),
            Cached {
                fetched_at: now,
                value,
            },
        );
    }

    pub async fn get_history(&self, symbol: &str, now: DateTime<Utc>) -> Option<Vec<PricePoint>> {
        let histories = self.histories.read().await;
        histories
            .get(symbol)
            .filter(|c| c.fetched_at > now - cache_ttl(now))
            .map(|c| c.value.clone())
    }

    pub async fn put_history(&self, symbol: &str, prices: Vec<PricePoint>, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(HISTORY_RETENTION_DAYS);
        let mut histories = self.histories.write().await;
        histories.retain(|_, c| c.fetched_at > cutoff);
        histories.insert(
            symbol.to_string(),
            Cached {
                fetched_at: now,
                value: prices,
            },
        );
    }

    /// Equal-weighted daily returns of whichever portfolio members are cached.
    /// Stale histories still count: correlation tolerates a lagging day.
    pub async fn portfolio_returns(&self, portfolio: &[String], exclude: &str) -> BTreeMap<String, f64> {
        let histories = self.histories.read().await;
        let members: HashMap<String, Vec<PricePoint>> = portfolio
            .iter()
            .filter(|s| s.as_str() != exclude)
            .filter_map(|s| histories.get(s).map(|c| (s.clone(), c.value.clone())))
            .collect();
        portfolio_returns(&members)
    }
}
