// src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub symbol: String,
    pub industry: String,
    pub sector: String,
    pub country: String,
    pub website: String,
}

impl Profile {
    pub fn unknown(symbol: &str) -> Self {
        Profile {
            symbol: symbol.to_string(),
            ..Profile::default()
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            name: "Unknown".to_string(),
            symbol: String::new(),
            industry: "Unknown".to_string(),
            sector: "Unknown".to_string(),
            country: "Unknown".to_string(),
            website: "#".to_string(),
        }
    }
}

/// One daily close. `date` is `YYYY-MM-DD` in exchange local time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsArticle {
    pub title: String,
    pub publisher: String,
    pub link: String,
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<ArticleSentiment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    /// Aggregate news polarity on a 0..=100 scale, 50 being neutral.
    pub overall_prediction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::NotAvailable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Default for Trend {
    fn default() -> Self {
        Trend::NotAvailable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAnalysis {
    pub risk_level: RiskLevel,
    /// Annualized volatility in percent.
    pub volatility: Option<f64>,
    /// Last day's return in percent.
    pub daily_return: Option<f64>,
    pub current_price: Option<f64>,
    pub latest_close: Option<f64>,
    pub trend: Trend,
    pub portfolio_correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskAnalysis {
    pub fn unavailable(error: impl Into<String>) -> Self {
        RiskAnalysis {
            error: Some(error.into()),
            ..RiskAnalysis::default()
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingMetrics {
    pub loss: Vec<f64>,
    pub val_loss: Vec<f64>,
    pub final_loss: f64,
    pub final_val_loss: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePrediction {
    pub predicted_price: f64,
    pub price_change: f64,
    pub last_close_price: f64,
    pub prediction_direction: String,
    pub prediction_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_metrics: Option<TrainingMetrics>,
}

impl PricePrediction {
    pub fn is_bullish(&self) -> bool {
        self.prediction_direction == "Bullish"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockDetails {
    pub current_quote: CurrentQuote,
    pub profile: Profile,
    pub historical_prices: Vec<PricePoint>,
    pub news: Vec<NewsArticle>,
    pub country_news: Vec<NewsArticle>,
    pub sentiment: Option<Sentiment>,
    pub risk_analysis: Option<RiskAnalysis>,
    pub price_prediction: Option<PricePrediction>,
}

impl StockDetails {
    pub fn empty(symbol: &str) -> Self {
        StockDetails {
            profile: Profile::unknown(symbol),
            ..StockDetails::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub currency: Option<String>,
    pub stock_exchange: Option<String>,
    pub exchange_short_name: Option<String>,
}
