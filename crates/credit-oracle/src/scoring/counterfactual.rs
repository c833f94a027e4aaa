use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::knowledge::{CausalKnowledgeBase, Feature, RiskDirection};
use super::model::clamp_probability;
use super::score::score_from_probability;

const SATISFIED_TOLERANCE: f64 = 0.02;
const INTERVENTION_SCALE: f64 = 0.3;
const MAX_COUNTERFACTUALS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Low,
    Medium,
    High,
}

/// Candidate action the applicant could take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intervention {
    pub feature: Feature,
    pub target: f64,
    pub description: &'static str,
    pub timeframe: &'static str,
    pub feasibility: Feasibility,
}

pub const INTERVENTIONS: [Intervention; 7] = [
    Intervention {
        feature: Feature::RevolvingUtilization,
        target: 0.3,
        description: "Pay down credit cards to below 30% utilization",
        timeframe: "1-3 months",
        feasibility: Feasibility::High,
    },
    Intervention {
        feature: Feature::MissedPayments12m,
        target: 0.0,
        description: "Bring all accounts current immediately",
        timeframe: "1-3 months",
        feasibility: Feasibility::High,
    },
    Intervention {
        feature: Feature::Inquiries6m,
        target: 0.0,
        description: "Stop applying for new credit for 6 months",
        timeframe: "6-12 months",
        feasibility: Feasibility::High,
    },
    Intervention {
        feature: Feature::GamblingAmount,
        target: 0.0,
        description: "Eliminate all gambling transactions",
        timeframe: "1-3 months",
        feasibility: Feasibility::Medium,
    },
    Intervention {
        feature: Feature::DtiRatio,
        target: 0.36,
        description: "Pay down debt to bring DTI below 36%",
        timeframe: "3-6 months",
        feasibility: Feasibility::Medium,
    },
    Intervention {
        feature: Feature::LoanPaymentRegularity,
        target: 1.0,
        description: "Set up autopay for all loan payments",
        timeframe: "3-6 months",
        feasibility: Feasibility::High,
    },
    Intervention {
        feature: Feature::CashFlowStress,
        target: 0.0,
        description: "Build emergency fund to cover monthly shortfalls",
        timeframe: "6-12 months",
        feasibility: Feasibility::Medium,
    },
];

/// Projected outcome of one intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterfactual {
    pub feature: Feature,
    pub description: String,
    pub current_value: f64,
    pub target_value: f64,
    pub projected_score: u16,
    pub score_improvement: u16,
    pub feasibility: Feasibility,
    pub timeframe: String,
    pub priority: u8,
}

fn priority_for(improvement: u16) -> u8 {
    if improvement > 30 {
        1
    } else if improvement > 15 {
        2
    } else {
        3
    }
}

/// Evaluates the fixed intervention list against the applicant's current position.
#[derive(Debug, Clone, Copy)]
pub struct CounterfactualExplainer {
    knowledge: &'static CausalKnowledgeBase,
    candidates: &'static [Intervention],
}

impl Default for CounterfactualExplainer {
    fn default() -> Self {
        Self::new(CausalKnowledgeBase::standard(), &INTERVENTIONS)
    }
}

impl CounterfactualExplainer {
    pub fn new(
        knowledge: &'static CausalKnowledgeBase,
        candidates: &'static [Intervention],
    ) -> Self {
        Self {
            knowledge,
            candidates,
        }
    }

    pub fn explain(&self, features: &FeatureVector, probability: f64) -> Vec<Counterfactual> {
        let base_score = score_from_probability(probability);

        let mut counterfactuals: Vec<Counterfactual> = self
            .candidates
            .iter()
            .filter_map(|intervention| {
                let current = features.get(intervention.feature);
                if (current - intervention.target).abs() < SATISFIED_TOLERANCE {
                    return None;
                }

                let edge = self.knowledge.edge_for(intervention.feature)?;
                let delta = match edge.direction {
                    RiskDirection::IncreasesRisk => {
                        (current - intervention.target) * edge.strength * INTERVENTION_SCALE
                    }
                    RiskDirection::DecreasesRisk => {
                        (intervention.target - current) * edge.strength * INTERVENTION_SCALE
                    }
                };

                let projected_score = score_from_probability(clamp_probability(probability - delta));
                if projected_score <= base_score {
                    return None;
                }

                let score_improvement = projected_score - base_score;
                Some(Counterfactual {
                    feature: intervention.feature,
                    description: intervention.description.to_string(),
                    current_value: current,
                    target_value: intervention.target,
                    projected_score,
                    score_improvement,
                    feasibility: intervention.feasibility,
                    timeframe: intervention.timeframe.to_string(),
                    priority: priority_for(score_improvement),
                })
            })
            .collect();

        counterfactuals.sort_by(|a, b| b.score_improvement.cmp(&a.score_improvement));
        counterfactuals.truncate(MAX_COUNTERFACTUALS);
        counterfactuals
    }
}
