// src/client/view.rs
use std::fmt::Write;

use crate::client::api::ClientError;
use crate::client::disclaimer::DISCLAIMER;
use crate::models::{
    CurrentQuote, NewsArticle, PricePoint, PricePrediction, Profile, RiskAnalysis, RiskLevel, Sentiment,
    StockDetails, Trend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Quote,
    Profile,
    PriceHistory,
    News,
    CountryNews,
    Sentiment,
    Risk,
    Prediction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Quote(CurrentQuote),
    Profile(Profile),
    PriceHistory(Vec<PricePoint>),
    News(Vec<NewsArticle>),
    CountryNews(Vec<NewsArticle>),
    Sentiment(Sentiment),
    Risk(RiskAnalysis),
    Prediction(PricePrediction),
}

impl Card {
    pub fn kind(&self) -> CardKind {
        match self {
            Card::Quote(_) => CardKind::Quote,
            Card::Profile(_) => CardKind::Profile,
            Card::PriceHistory(_) => CardKind::PriceHistory,
            Card::News(_) => CardKind::News,
            Card::CountryNews(_) => CardKind::CountryNews,
            Card::Sentiment(_) => CardKind::Sentiment,
            Card::Risk(_) => CardKind::Risk,
            Card::Prediction(_) => CardKind::Prediction,
        }
    }
}

/// What the page shows once loading ends: either a single alert, or the
/// cards for whichever sections the payload carried.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Failed { alert: String },
    Ready { symbol: String, cards: Vec<Card> },
}

impl DashboardView {
    pub fn from_result(result: Result<StockDetails, ClientError>) -> Self {
        match result {
            Err(e) => DashboardView::Failed { alert: e.to_string() },
            Ok(details) => {
                let symbol = details.profile.symbol.clone();
                let mut cards = vec![Card::Quote(details.current_quote), Card::Profile(details.profile)];
                if !details.historical_prices.is_empty() {
                    cards.push(Card::PriceHistory(details.historical_prices));
                }
                if !details.news.is_empty() {
                    cards.push(Card::News(details.news));
                }
                if !details.country_news.is_empty() {
                    cards.push(Card::CountryNews(details.country_news));
                }
                if let Some(sentiment) = details.sentiment {
                    cards.push(Card::Sentiment(sentiment));
                }
                if let Some(risk) = details.risk_analysis {
                    cards.push(Card::Risk(risk));
                }
                if let Some(prediction) = details.price_prediction {
                    cards.push(Card::Prediction(prediction));
                }
                DashboardView::Ready { symbol, cards }
            }
        }
    }

    pub fn alert(&self) -> Option<&str> {
        match self {
            DashboardView::Failed { alert } => Some(alert),
            DashboardView::Ready { .. } => None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        match self {
            DashboardView::Failed { .. } => &[],
            DashboardView::Ready { cards, .. } => cards.as_slice(),
        }
    }

    pub fn has_card(&self, kind: CardKind) -> bool {
        self.cards().iter().any(|c| c.kind() == kind)
    }

    pub fn render(&self, disclaimer_visible: bool) -> String {
        let mut out = String::new();
        match self {
            DashboardView::Failed { alert } => {
                let _ = writeln!(out, "[error] {}", alert);
            }
            DashboardView::Ready { symbol, cards } => {
                let _ = writeln!(out, "=== {} ===", symbol);
                for card in cards {
                    render_card(&mut out, card, disclaimer_visible);
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn render_news(out: &mut String, heading: &str, articles: &[NewsArticle]) {
    let _ = writeln!(out, "{}", heading);
    for article in articles {
        let tag = match &article.sentiment {
            Some(s) => format!(" [{:?} {:+.2}]", s.label, s.score),
            None => String::new(),
        };
        let _ = writeln!(out, "  - {} ({}){}", article.title, article.publisher, tag);
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value.map(|v| format!("{:.2}{}", v, suffix)).unwrap_or_else(|| "N/A".to_string())
}

fn render_card(out: &mut String, card: &Card, disclaimer_visible: bool) {
    match card {
        Card::Quote(q) => {
            let _ = writeln!(
                out,
                "Price: ₹{:.2}  {:+.2} ({:+.2}%)",
                q.price, q.change, q.change_percent
            );
        }
        Card::Profile(p) => {
            let _ = writeln!(out, "{} ({})", p.name, p.symbol);
            let _ = writeln!(out, "  {} / {} / {}", p.sector, p.industry, p.country);
            let _ = writeln!(out, "  {}", p.website);
        }
        Card::PriceHistory(prices) => {
            let (first, last) = match (prices.first(), prices.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    let _ = writeln!(out, "History: no closes");
                    return;
                }
            };
            let _ = writeln!(
                out,
                "History: {} closes, {} ₹{:.2} -> {} ₹{:.2}",
                prices.len(),
                first.date,
                first.close,
                last.date,
                last.close
            );
        }
        Card::News(articles) => render_news(out, "Company news:", articles),
        Card::CountryNews(articles) => render_news(out, "India market news:", articles),
        Card::Sentiment(s) => {
            let _ = writeln!(out, "News sentiment: {:.2}/100", s.overall_prediction);
        }
        Card::Risk(r) => {
            let level = match r.risk_level {
                RiskLevel::Low => "Low",
                RiskLevel::Medium => "Medium",
                RiskLevel::High => "High",
                RiskLevel::NotAvailable => "N/A",
            };
            let trend = match r.trend {
                Trend::Uptrend => "Uptrend",
                Trend::Downtrend => "Downtrend",
                Trend::Sideways => "Sideways",
                Trend::NotAvailable => "N/A",
            };
            let _ = writeln!(out, "Risk: {}  trend: {}", level, trend);
            let _ = writeln!(
                out,
                "  volatility {}  daily return {}  portfolio correlation {}",
                fmt_opt(r.volatility, "%"),
                fmt_opt(r.daily_return, "%"),
                fmt_opt(r.portfolio_correlation, "")
            );
        }
        Card::Prediction(p) => {
            let _ = writeln!(
                out,
                "Prediction: ₹{:.2} ({}, {:+.2})  confidence {:.2}%",
                p.predicted_price, p.prediction_direction, p.price_change, p.prediction_confidence
            );
            if let Some(metrics) = &p.training_metrics {
                let _ = writeln!(
                    out,
                    "  loss {:.5}  val_loss {:.5} over {} epochs",
                    metrics.final_loss,
                    metrics.final_val_loss,
                    metrics.loss.len()
                );
            }
            if disclaimer_visible {
                let _ = writeln!(out, "  ! {}", DISCLAIMER);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> StockDetails {
        let mut details = StockDetails::empty("INFY.NS");
        details.historical_prices = vec![
            PricePoint {
                date: "2024-05-02".into(),
                close: 1420.0,
            },
            PricePoint {
                date: "2024-05-03".into(),
                close: 1435.5,
            },
        ];
        details.sentiment = Some(Sentiment {
            overall_prediction: 58.0,
        });
        details.price_prediction = Some(PricePrediction {
            predicted_price: 1440.0,
            price_change: 4.5,
            last_close_price: 1435.5,
            prediction_direction: "Bullish".into(),
            prediction_confidence: 81.0,
            training_metrics: None,
        });
        details
    }

    #[test]
    fn failure_renders_one_alert_and_no_cards() {
        let view = DashboardView::from_result(Err(ClientError::Api {
            status: 404,
            message: "No market data found for XYZ.NS".into(),
        }));
        assert_eq!(view.alert(), Some("No market data found for XYZ.NS"));
        assert!(view.cards().is_empty());
        let rendered = view.render(true);
        assert_eq!(rendered.matches("[error]").count(), 1);
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn missing_prediction_omits_its_card() {
        let mut payload = details();
        payload.price_prediction = None;
        let view = DashboardView::from_result(Ok(payload));
        assert!(view.alert().is_none());
        assert!(!view.has_card(CardKind::Prediction));
        assert!(view.has_card(CardKind::Sentiment));
        assert!(!view.has_card(CardKind::Risk));
    }

    #[test]
    fn cards_follow_payload_sections() {
        let view = DashboardView::from_result(Ok(details()));
        let kinds: Vec<CardKind> = view.cards().iter().map(Card::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CardKind::Quote,
                CardKind::Profile,
                CardKind::PriceHistory,
                CardKind::Sentiment,
                CardKind::Prediction
            ]
        );
    }

    #[test]
    fn empty_history_card_renders() {
        let view = DashboardView::Ready {
            symbol: "INFY.NS".into(),
            cards: vec![Card::PriceHistory(Vec::new())],
        };
        assert!(view.render(false).contains("History: no closes"));
    }

    #[test]
    fn disclaimer_follows_visibility() {
        let view = DashboardView::from_result(Ok(details()));
        assert!(view.render(true).contains(DISCLAIMER));
        assert!(!view.render(false).contains(DISCLAIMER));
    }
}
