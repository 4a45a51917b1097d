use chrono::{Datelike, Utc};
use chrono_tz::Asia::Kolkata;
use env_logger;
use log::info;

use stock_insight::services::scheduler::PORTFOLIO_REFRESH_SCHEDULE;
use stock_insight::services::store::{cache_ttl, is_market_open};

fn main() {
    env_logger::init();

    info!("Testing cache timing logic...");

    let now = Utc::now();
    let ist = now.with_timezone(&Kolkata);

    info!("Current time:");
    info!("  UTC: {}", now);
    info!("  Kolkata: {} ({:?})", ist, ist.weekday());

    info!("NSE session (09:15 - 15:30 IST, Mon-Fri):");
    info!("  Market open now: {}", is_market_open(now));
    info!("  Cache TTL now: {} minutes", cache_ttl(now).num_minutes());
    info!("Portfolio refresh schedule: {}", PORTFOLIO_REFRESH_SCHEDULE);
}
