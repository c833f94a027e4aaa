use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::knowledge::{CausalKnowledgeBase, CausalTarget, Feature, RiskDirection};

const IMPACT_THRESHOLD: f64 = 0.04;
const MAX_FACTORS: usize = 8;

/// Ranked causal contribution of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalFactor {
    pub feature: Feature,
    pub label: String,
    pub direction: RiskDirection,
    pub weight: f64,
    pub impact: f64,
    pub value: f64,
}

/// Ranks edges by how much they currently move risk.
///
/// Risk-raising edges contribute `value * strength`; protective edges contribute
/// `(1 - value) * strength`, i.e. how much protection is missing.
#[derive(Debug, Clone, Copy)]
pub struct CausalAttributor {
    knowledge: &'static CausalKnowledgeBase,
}

impl Default for CausalAttributor {
    fn default() -> Self {
        Self::new(CausalKnowledgeBase::standard())
    }
}

impl CausalAttributor {
    pub fn new(knowledge: &'static CausalKnowledgeBase) -> Self {
        Self { knowledge }
    }

    pub fn attribute(&self, features: &FeatureVector) -> Vec<CausalFactor> {
        let mut factors: Vec<CausalFactor> = self
            .knowledge
            .edges_targeting(CausalTarget::Probability)
            .filter_map(|edge| {
                let value = features.get(edge.cause);
                let impact = match edge.direction {
                    RiskDirection::IncreasesRisk => value * edge.strength,
                    RiskDirection::DecreasesRisk => (1.0 - value) * edge.strength,
                };
                (impact > IMPACT_THRESHOLD).then(|| CausalFactor {
                    feature: edge.cause,
                    label: edge.cause.label().to_string(),
                    direction: edge.direction,
                    weight: edge.strength,
                    impact,
                    value,
                })
            })
            .collect();

        factors.sort_by(|a, b| b.impact.total_cmp(&a.impact));
        factors.truncate(MAX_FACTORS);
        factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protective_edges_report_missing_protection() {
        let features = FeatureVector::from_pairs([
            (Feature::IncomeStability, 1.0),
            (Feature::LoanPaymentRegularity, 0.5),
        ]);
        let factors = CausalAttributor::default().attribute(&features);

        assert!(factors
            .iter()
            .all(|factor| factor.feature != Feature::IncomeStability));
        let regularity = factors
            .iter()
            .find(|factor| factor.feature == Feature::LoanPaymentRegularity)
            .expect("regularity ranked");
        assert!((regularity.impact - 0.34).abs() < 1e-12);
        assert_eq!(regularity.label, "Loan payment consistency");
    }

    #[test]
    fn output_is_sorted_thresholded_and_truncated() {
        let features = FeatureVector::from_pairs([
            (Feature::RevolvingUtilization, 0.9),
            (Feature::MissedPayments12m, 0.5),
            (Feature::DerogatoryMarks, 0.3),
            (Feature::GamblingAmount, 0.4),
            (Feature::CashFlowStress, 0.6),
            (Feature::DtiRatio, 0.8),
            (Feature::Inquiries6m, 0.5),
            (Feature::AtmFrequency, 0.1),
        ]);
        let factors = CausalAttributor::default().attribute(&features);

        assert_eq!(factors.len(), 8);
        assert!(factors.iter().all(|factor| factor.impact > 0.04));
        assert!(factors
            .windows(2)
            .all(|pair| pair[0].impact >= pair[1].impact));
    }
}
