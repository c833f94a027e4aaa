use serde::{Deserialize, Serialize};

use super::model::clamp_probability;

pub const SCORE_MIN: u16 = 300;
pub const SCORE_MAX: u16 = 850;
const SCORE_ANCHOR: f64 = 680.0;
const POINTS_PER_LOG_ODDS: f64 = 55.0;
const LOGIT_EPSILON: f64 = 1e-6;
const INTERVAL_MARGIN: f64 = 0.07;

/// Probability-to-score conversion used everywhere a score is reported.
///
/// `680 - ln(p / (1 - p)) * 55`, rounded and clamped to `[300, 850]`. Monotonically
/// non-increasing in `p`.
pub fn score_from_probability(probability: f64) -> u16 {
    let p = if probability.is_nan() {
        0.5
    } else {
        probability.clamp(LOGIT_EPSILON, 1.0 - LOGIT_EPSILON)
    };
    let raw = SCORE_ANCHOR - (p / (1.0 - p)).ln() * POINTS_PER_LOG_ODDS;
    raw.clamp(f64::from(SCORE_MIN), f64::from(SCORE_MAX)).round() as u16
}

/// Score range around a point estimate; `low <= high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: u16,
    pub high: u16,
}

/// Fixed-margin stand-in for a calibrated conformal interval.
#[derive(Debug, Clone, Copy)]
pub struct UncertaintyEstimator {
    margin: f64,
}

impl Default for UncertaintyEstimator {
    fn default() -> Self {
        Self {
            margin: INTERVAL_MARGIN,
        }
    }
}

impl UncertaintyEstimator {
    pub fn interval(&self, probability: f64) -> ConfidenceInterval {
        ConfidenceInterval {
            low: score_from_probability(clamp_probability(probability + self.margin)),
            high: score_from_probability(clamp_probability(probability - self.margin)),
        }
    }
}
