use dotenv::dotenv;
use env_logger;
use log::{error, info};
use std::env;

use stock_insight::config::Config;
use stock_insight::services::yahoo::quote_from_history;
use stock_insight::services::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let symbol = env::args().nth(1).unwrap_or_else(|| "TCS.NS".to_string());
    info!("Testing Yahoo Finance fetching for {}...", symbol);

    let state = AppState::new(Config::from_env()?)?;

    match state.yahoo.fetch_profile(&symbol).await {
        Ok(profile) => info!("SUCCESS: profile {:?}", profile),
        Err(e) => error!("ERROR: failed to fetch profile: {}", e),
    }

    match state.yahoo.fetch_history(&symbol).await {
        Ok(history) => {
            info!("SUCCESS: {} daily closes", history.prices.len());
            if let (Some(first), Some(last)) = (history.prices.first(), history.prices.last()) {
                info!("  {} {:.2} .. {} {:.2}", first.date, first.close, last.date, last.close);
            }
            info!("  quote: {:?}", quote_from_history(&history.prices, history.market_price, history.market_date.as_deref()));
        }
        Err(e) => {
            error!("ERROR: failed to fetch history: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
