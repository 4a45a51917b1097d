// src/services/prediction.rs
use std::fmt;

use log::{debug, info};

use crate::models::{PricePrediction, TrainingMetrics};

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    InsufficientHistory { required: usize, available: usize },
    InvalidPrices,
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictionError::InsufficientHistory { required, available } => write!(
                f,
                "Need at least {} closing prices to predict, have {}",
                required, available
            ),
            PredictionError::InvalidPrices => write!(f, "Price history contains non-finite values"),
        }
    }
}

impl std::error::Error for PredictionError {}

/// Next-close forecaster over a daily closing-price series, oldest first.
pub trait PricePredictor: Send + Sync {
    fn predict(&self, closes: &[f64]) -> Result<PricePrediction, PredictionError>;

    fn name(&self) -> &str;
}

/// Linear model over a sliding window of min-max normalized closes, fit by
/// full-batch gradient descent. Loss is MSE in normalized units.
#[derive(Debug, Clone)]
pub struct WindowedRegression {
    pub window: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub validation_split: f64,
    pub min_history: usize,
}

impl Default for WindowedRegression {
    fn default() -> Self {
        WindowedRegression {
            window: 10,
            epochs: 200,
            learning_rate: 0.05,
            validation_split: 0.2,
            min_history: 30,
        }
    }
}

struct Sample<'a> {
    inputs: &'a [f64],
    target: f64,
}

struct Model {
    weights: Vec<f64>,
    bias: f64,
}

impl Model {
    fn forward(&self, inputs: &[f64]) -> f64 {
        self.weights.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>() + self.bias
    }

    fn mse(&self, samples: &[Sample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples
            .iter()
            .map(|s| (self.forward(s.inputs) - s.target).powi(2))
            .sum::<f64>()
            / samples.len() as f64
    }

    fn step(&mut self, samples: &[Sample], learning_rate: f64) {
        let m = samples.len() as f64;
        let mut grad_w = vec![0.0; self.weights.len()];
        let mut grad_b = 0.0;
        for sample in samples {
            let err = self.forward(sample.inputs) - sample.target;
            for (g, x) in grad_w.iter_mut().zip(sample.inputs) {
                *g += 2.0 * err * x / m;
            }
            grad_b += 2.0 * err / m;
        }
        for (w, g) in self.weights.iter_mut().zip(grad_w) {
            *w -= learning_rate * g;
        }
        self.bias -= learning_rate * grad_b;
    }
}

impl PricePredictor for WindowedRegression {
    fn predict(&self, closes: &[f64]) -> Result<PricePrediction, PredictionError> {
        let required = self.min_history.max(self.window + 2);
        if closes.len() < required {
            return Err(PredictionError::InsufficientHistory {
                required,
                available: closes.len(),
            });
        }
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(PredictionError::InvalidPrices);
        }

        let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if max > min { max - min } else { 1.0 };
        let normalized: Vec<f64> = closes.iter().map(|c| (c - min) / range).collect();

        let samples: Vec<Sample> = (self.window..normalized.len())
            .map(|i| Sample {
                inputs: &normalized[i - self.window..i],
                target: normalized[i],
            })
            .collect();

        let val_len = ((samples.len() as f64 * self.validation_split).round() as usize).clamp(1, samples.len() - 1);
        let (train, val) = samples.split_at(samples.len() - val_len);

        let mut model = Model {
            weights: vec![0.0; self.window],
            bias: 0.0,
        };
        let mut loss = Vec::with_capacity(self.epochs);
        let mut val_loss = Vec::with_capacity(self.epochs);
        for _ in 0..self.epochs {
            model.step(train, self.learning_rate);
            loss.push(model.mse(train));
            val_loss.push(model.mse(val));
        }

        let final_loss = loss.last().copied().unwrap_or(0.0);
        let final_val_loss = val_loss.last().copied().unwrap_or(0.0);
        debug!(
            "Trained {} on {} samples: loss {:.6}, val_loss {:.6}",
            self.name(),
            train.len(),
            final_loss,
            final_val_loss
        );

        let last_window = &normalized[normalized.len() - self.window..];
        let predicted_price = round2(model.forward(last_window) * range + min);
        let last_close_price = closes[closes.len() - 1];
        let price_change = round2(predicted_price - last_close_price);

        let prediction_direction = if price_change > 0.0 {
            "Bullish"
        } else if price_change < 0.0 {
            "Bearish"
        } else {
            "Neutral"
        };
        let prediction_confidence = round2(((1.0 - final_val_loss.sqrt()) * 100.0).clamp(0.0, 100.0));

        info!(
            "Predicted next close {:.2} ({}) with {:.2}% confidence",
            predicted_price, prediction_direction, prediction_confidence
        );

        Ok(PricePrediction {
            predicted_price,
            price_change,
            last_close_price,
            prediction_direction: prediction_direction.to_string(),
            prediction_confidence,
            training_metrics: Some(TrainingMetrics {
                loss,
                val_loss,
                final_loss,
                final_val_loss,
            }),
        })
    }

    fn name(&self) -> &str {
        "windowed-regression"
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
