// src/services/fmp.rs
use std::fmt;

use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{NewsArticle, SearchResult};

/// Terms that mark a general-news story as relevant to the Indian market.
const INDIA_TERMS: [&str; 6] = ["india", "nse", "bse", "sensex", "nifty", "rupee"];

#[derive(Debug)]
pub enum FmpError {
    Unauthorized,
    Request(String),
}

impl fmt::Display for FmpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FmpError::Unauthorized => write!(f, "API authentication failed"),
            FmpError::Request(msg) => write!(f, "API request error: {}", msg),
        }
    }
}

impl std::error::Error for FmpError {}

impl From<reqwest::Error> for FmpError {
    fn from(err: reqwest::Error) -> Self {
        FmpError::Request(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    site: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_date: String,
    #[serde(default)]
    text: String,
}

impl From<FmpArticle> for NewsArticle {
    fn from(a: FmpArticle) -> Self {
        NewsArticle {
            title: a.title,
            publisher: a.site,
            link: a.url,
            published_at: a.published_date,
            sentiment: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpTicker {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    currency: Option<String>,
    stock_exchange: Option<String>,
    exchange_short_name: Option<String>,
}

#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        FmpClient {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, FmpError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                error!("FMP authentication failed for {}", path);
                Err(FmpError::Unauthorized)
            }
            status if !status.is_success() => Err(FmpError::Request(format!("HTTP {} from {}", status, path))),
            _ => Ok(resp.json().await?),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, FmpError> {
        info!("Searching tickers matching '{}'", query);
        let tickers: Vec<FmpTicker> = self
            .get_json(
                "/v3/search-ticker",
                &[("query", query.to_string()), ("limit", "10".to_string())],
            )
            .await?;

        Ok(tickers
            .into_iter()
            .map(|t| SearchResult {
                symbol: t.symbol,
                name: t.name,
                currency: t.currency,
                stock_exchange: t.stock_exchange,
                exchange_short_name: t.exchange_short_name,
            })
            .collect())
    }

    pub async fn stock_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, FmpError> {
        info!("Fetching news for {}", symbol);
        let articles: Vec<FmpArticle> = self
            .get_json(
                "/v3/stock_news",
                &[("tickers", symbol.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        debug!("Received {} articles for {}", articles.len(), symbol);

        Ok(articles.into_iter().take(limit).map(NewsArticle::from).collect())
    }

    pub async fn india_news(&self, limit: usize) -> Result<Vec<NewsArticle>, FmpError> {
        info!("Fetching India market news");
        let articles: Vec<FmpArticle> = self.get_json("/v4/general_news", &[("page", "0".to_string())]).await?;

        Ok(articles
            .into_iter()
            .filter(mentions_india)
            .take(limit)
            .map(NewsArticle::from)
            .collect())
    }
}

fn mentions_india(article: &FmpArticle) -> bool {
    let haystack = format!("{} {}", article.title, article.text).to_lowercase();
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| INDIA_TERMS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, text: &str) -> FmpArticle {
        FmpArticle {
            title: title.to_string(),
            site: String::new(),
            url: String::new(),
            published_date: String::new(),
            text: text.to_string(),
        }
    }

    #[test]
    fn india_filter_matches_whole_words() {
        assert!(mentions_india(&article("Sensex closes higher", "")));
        assert!(mentions_india(&article("Asia markets", "Nifty 50 gains on IT stocks")));
        assert!(!mentions_india(&article("Indiana utilities rally", "")));
    }

    #[test]
    fn article_maps_fields() {
        let raw: FmpArticle = serde_json::from_str(
            r#"{"title": "TCS wins deal", "site": "Reuters", "url": "https://example.com/a", "publishedDate": "2024-05-01 10:00:00"}"#,
        )
        .unwrap();
        let news = NewsArticle::from(raw);
        assert_eq!(news.publisher, "Reuters");
        assert_eq!(news.link, "https://example.com/a");
        assert_eq!(news.published_at, "2024-05-01 10:00:00");
        assert!(news.sentiment.is_none());
    }

    #[test]
    fn error_messages_match_api_contract() {
        assert_eq!(FmpError::Unauthorized.to_string(), "API authentication failed");
        assert!(FmpError::Request("timeout".into()).to_string().starts_with("API request error"));
    }
}
