// src/services/mod.rs
use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::BoxError;

pub mod details;
pub mod fmp;
pub mod prediction;
pub mod risk;
pub mod scheduler;
pub mod sentiment;
pub mod store;
pub mod yahoo;

use fmp::FmpClient;
use prediction::{PricePredictor, WindowedRegression};
use sentiment::SentimentAnalyzer;
use store::MarketStore;
use yahoo::YahooClient;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub yahoo: YahooClient,
    pub fmp: FmpClient,
    pub store: MarketStore,
    pub sentiment: SentimentAnalyzer,
    pub predictor: Box<dyn PricePredictor>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, BoxError> {
        Self::with_predictor(config, Box::new(WindowedRegression::default()))
    }

    pub fn with_predictor(config: Config, predictor: Box<dyn PricePredictor>) -> Result<Arc<Self>, BoxError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(config.request_timeout)
            .build()?;

        Ok(Arc::new(AppState {
            yahoo: YahooClient::new(client.clone(), config.yahoo_base_url.clone()),
            fmp: FmpClient::new(client, config.fmp_base_url.clone(), config.fmp_api_key.clone()),
            store: MarketStore::new(),
            sentiment: SentimentAnalyzer::new()?,
            predictor,
            config,
        }))
    }
}
