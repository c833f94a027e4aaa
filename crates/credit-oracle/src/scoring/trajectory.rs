use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::knowledge::Feature;
use super::model::clamp_probability;
use super::score::score_from_probability;

pub const HORIZONS: [u32; 3] = [3, 6, 12];
const LONG_RUN_BASE_RATE: f64 = 0.10;
const REVERSION_RATE: f64 = 0.03;
const MAX_DRIVERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Deteriorating,
    Stable,
}

impl Trend {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Deteriorating => "deteriorating",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub horizon_months: u32,
    pub predicted_score: u16,
    pub predicted_probability: f64,
    pub score_delta: i32,
    pub key_drivers: Vec<String>,
    pub trend: Trend,
}

/// Forecast checkpoints keyed the way the response contract names them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub month_3: TrajectoryPoint,
    pub month_6: TrajectoryPoint,
    pub month_12: TrajectoryPoint,
}

impl Trajectory {
    pub fn points(&self) -> [&TrajectoryPoint; 3] {
        [&self.month_3, &self.month_6, &self.month_12]
    }
}

/// Month-by-month drift with mean reversion toward the long-run default rate.
///
/// Each horizon is simulated independently from the starting probability, so the 12-month
/// point reflects exactly twelve simulated months.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryForecaster;

impl TrajectoryForecaster {
    pub fn forecast(&self, probability: f64, features: &FeatureVector) -> Trajectory {
        let drift = monthly_drift(features);
        let drivers = key_drivers(features);
        let base_score = score_from_probability(probability);

        let [month_3, month_6, month_12] = HORIZONS.map(|horizon| {
            let predicted_probability = simulate(probability, drift, horizon);
            let predicted_score = score_from_probability(predicted_probability);
            let trend = match predicted_score.cmp(&base_score) {
                std::cmp::Ordering::Greater => Trend::Improving,
                std::cmp::Ordering::Less => Trend::Deteriorating,
                std::cmp::Ordering::Equal => Trend::Stable,
            };

            TrajectoryPoint {
                horizon_months: horizon,
                predicted_score,
                predicted_probability,
                score_delta: i32::from(predicted_score) - i32::from(base_score),
                key_drivers: drivers.clone(),
                trend,
            }
        });

        Trajectory {
            month_3,
            month_6,
            month_12,
        }
    }
}

pub(crate) fn monthly_drift(features: &FeatureVector) -> f64 {
    (features.get(Feature::LoanPaymentRegularity) - 0.5) * -0.015
        + (features.get(Feature::IncomeStability) - 0.5) * -0.010
        + features.get(Feature::CashFlowStress) * 0.008
}

fn simulate(start: f64, drift: f64, months: u32) -> f64 {
    (0..months).fold(clamp_probability(start), |probability, _| {
        clamp_probability(probability + drift + REVERSION_RATE * (LONG_RUN_BASE_RATE - probability))
    })
}

fn key_drivers(features: &FeatureVector) -> Vec<String> {
    let regularity = features.get(Feature::LoanPaymentRegularity);
    let stability = features.get(Feature::IncomeStability);
    let stress = features.get(Feature::CashFlowStress);

    let mut drivers = Vec::new();
    if regularity > 0.6 {
        drivers.push("continued on-time payment history");
    } else if regularity < 0.4 {
        drivers.push("payment delinquency risk increasing");
    }
    if stability > 0.6 {
        drivers.push("income growth supporting stability");
    }
    if stress > 0.3 {
        drivers.push("cash flow stress remains elevated");
    }

    drivers
        .into_iter()
        .take(MAX_DRIVERS)
        .map(str::to_string)
        .collect()
}
