use serde::{Deserialize, Serialize};

use super::attribution::CausalFactor;
use super::classification::{RiskSeverity, RiskType};
use super::counterfactual::Counterfactual;
use super::narrative::NarrativeSource;
use super::trajectory::Trajectory;

pub const MODEL_VERSION: &str = "oracle-v1.0.0";

/// Full scoring outcome for one request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub score: u16,
    pub probability: f64,
    pub confidence_low: u16,
    pub confidence_high: u16,
    pub risk_type: RiskType,
    pub risk_severity: RiskSeverity,
    pub fair: bool,
    pub causal_factors: Vec<CausalFactor>,
    pub counterfactuals: Vec<Counterfactual>,
    pub trajectory: Trajectory,
    pub adverse_action_reasons: Vec<String>,
    pub explanation: String,
    pub improvement_plan: String,
    pub narrative_source: NarrativeSource,
    pub model_version: String,
    pub knowledge_base_version: String,
    pub inference_ms: u64,
}

impl ScoringResult {
    /// Copy with timing zeroed, for comparing runs.
    pub fn without_timing(&self) -> Self {
        Self {
            inference_ms: 0,
            ..self.clone()
        }
    }
}
