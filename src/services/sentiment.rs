// src/services/sentiment.rs
use log::debug;
use regex::Regex;

use crate::models::{ArticleSentiment, NewsArticle, Sentiment, SentimentLabel};
use crate::BoxError;

const POSITIVE: &[&str] = &[
    "beat", "beats", "boost", "boosts", "bullish", "buy", "climb", "climbs", "dividend", "expand",
    "expands", "expansion", "gain", "gains", "growth", "high", "higher", "improve", "improves",
    "jump", "jumps", "outperform", "outperforms", "profit", "profits", "rally", "rallies", "record",
    "rise", "rises", "soar", "soars", "strong", "stronger", "surge", "surges", "upgrade",
    "upgraded", "upbeat", "win", "wins",
];

const NEGATIVE: &[&str] = &[
    "bearish", "cut", "cuts", "decline", "declines", "default", "downgrade", "downgraded", "drop",
    "drops", "fall", "falls", "fraud", "layoff", "layoffs", "loss", "losses", "lower", "miss",
    "misses", "penalty", "plunge", "plunges", "probe", "sell", "selloff", "slump", "slumps",
    "tumble", "tumbles", "underperform", "warning", "weak", "weaker",
];

const NEGATORS: &[&str] = &["no", "not", "never", "without", "fails", "failed"];

const NEUTRAL_BAND: f64 = 0.05;

/// Lexicon scorer for news headlines. A negator flips the polarity of the
/// next scored word.
pub struct SentimentAnalyzer {
    tokenizer: Regex,
}

impl SentimentAnalyzer {
    pub fn new() -> Result<Self, BoxError> {
        Ok(SentimentAnalyzer {
            tokenizer: Regex::new(r"[a-z]+(?:'[a-z]+)?")?,
        })
    }

    /// Polarity in [-1, 1]; 0 when the text has no lexicon hits.
    pub fn score_text(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negate = false;

        for token in self.tokenizer.find_iter(&lowered).map(|m| m.as_str()) {
            if NEGATORS.contains(&token) || token.ends_with("n't") {
                negate = true;
                continue;
            }
            let polarity = if POSITIVE.contains(&token) {
                1
            } else if NEGATIVE.contains(&token) {
                -1
            } else {
                continue;
            };
            let polarity = if negate { -polarity } else { polarity };
            negate = false;
            if polarity > 0 {
                positive += 1;
            } else {
                negative += 1;
            }
        }

        let total = positive + negative;
        if total == 0 {
            0.0
        } else {
            (positive as f64 - negative as f64) / total as f64
        }
    }

    pub fn score_article(&self, article: &NewsArticle) -> ArticleSentiment {
        let score = self.score_text(&article.title);
        ArticleSentiment {
            label: label_for(score),
            score,
        }
    }

    /// Annotates every article and returns the aggregate, or `None` when there
    /// is nothing to score.
    pub fn analyze(&self, articles: Vec<NewsArticle>) -> (Vec<NewsArticle>, Option<Sentiment>) {
        if articles.is_empty() {
            return (articles, None);
        }

        let scored: Vec<NewsArticle> = articles
            .into_iter()
            .map(|mut article| {
                article.sentiment = Some(self.score_article(&article));
                article
            })
            .collect();

        let mean = scored
            .iter()
            .filter_map(|a| a.sentiment.as_ref())
            .map(|s| s.score)
            .sum::<f64>()
            / scored.len() as f64;

        let overall = round2(50.0 * (1.0 + mean));
        debug!("Scored {} articles, mean polarity {:.3}, overall {}", scored.len(), mean, overall);

        (
            scored,
            Some(Sentiment {
                overall_prediction: overall,
            }),
        )
    }
}

pub fn label_for(score: f64) -> SentimentLabel {
    if score > NEUTRAL_BAND {
        SentimentLabel::Positive
    } else if score < -NEUTRAL_BAND {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
