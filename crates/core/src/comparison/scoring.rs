//! Weighted decision score used as the quantitative cross-check.

use super::metrics::DerivedMetrics;
use crate::domain::product::ProductKey;

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight for omega-3 mg per serving (default: 0.25)
    pub omega3: f64,
    /// Weight for EPA mg per serving (default: 0.25)
    pub epa: f64,
    /// Weight for DHA mg per serving (default: 0.15)
    pub dha: f64,
    /// Weight for the value factor, applied after scaling by 100 (default: 0.35)
    pub value: f64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights =
    ScoringWeights { omega3: 0.25, epa: 0.25, dha: 0.15, value: 0.35 };

/// Scale applied to the value factor so it competes with mg-sized terms.
const VALUE_FACTOR_SCALE: f64 = 100.0;

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionScorer {
    weights: ScoringWeights,
}

impl DecisionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Higher is more favourable.
    pub fn score(&self, metrics: &DerivedMetrics) -> f64 {
        let value = value_factor(metrics.price_per_1000mg_omega3) * VALUE_FACTOR_SCALE;

        metrics.omega3_per_serving_mg * self.weights.omega3
            + metrics.epa_per_serving_mg * self.weights.epa
            + metrics.dha_per_serving_mg * self.weights.dha
            + value * self.weights.value
    }
}

/// Inverse cost per 1000mg omega-3, or zero when that cost is unusable.
pub fn value_factor(price_per_1000mg_omega3: Option<f64>) -> f64 {
    match price_per_1000mg_omega3 {
        Some(price) if price.is_finite() && price > 0.0 => 1.0 / price,
        _ => 0.0,
    }
}

/// The first product wins ties.
pub fn pick_winner<'a>(
    first: &'a ProductKey,
    first_score: f64,
    second: &'a ProductKey,
    second_score: f64,
) -> &'a ProductKey {
    if first_score >= second_score {
        first
    } else {
        second
    }
}
