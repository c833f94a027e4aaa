use super::features::FeatureVector;
use super::knowledge::{CausalKnowledgeBase, CausalTarget, RiskDirection};

pub const BASE_RATE: f64 = 0.15;
pub const PROBABILITY_FLOOR: f64 = 0.01;
pub const PROBABILITY_CEILING: f64 = 0.99;
const EDGE_SCALE: f64 = 0.08;

/// Clamp into `[0.01, 0.99]`; NaN collapses to the base rate.
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        return BASE_RATE;
    }
    probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}

/// Linear causal model: base rate plus one signed contribution per edge.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityModel {
    knowledge: &'static CausalKnowledgeBase,
}

impl Default for ProbabilityModel {
    fn default() -> Self {
        Self::new(CausalKnowledgeBase::standard())
    }
}

impl ProbabilityModel {
    pub fn new(knowledge: &'static CausalKnowledgeBase) -> Self {
        Self { knowledge }
    }

    pub fn probability(&self, features: &FeatureVector) -> f64 {
        let contribution: f64 = self
            .knowledge
            .edges_targeting(CausalTarget::Probability)
            .map(|edge| {
                let magnitude = features.get(edge.cause) * edge.strength * EDGE_SCALE;
                match edge.direction {
                    RiskDirection::IncreasesRisk => magnitude,
                    RiskDirection::DecreasesRisk => -magnitude,
                }
            })
            .sum();

        clamp_probability(BASE_RATE + contribution)
    }
}
