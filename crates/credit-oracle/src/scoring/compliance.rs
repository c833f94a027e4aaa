use super::attribution::CausalFactor;
use super::knowledge::RiskDirection;

const FAIRNESS_FLOOR: f64 = 0.02;
const FAIRNESS_CEILING: f64 = 0.95;
const ADVERSE_ACTION_THRESHOLD: f64 = 0.35;
const MAX_ADVERSE_REASONS: usize = 4;

/// Sanity bound on the probability; a stand-in for a trained adversarial fairness check.
#[derive(Debug, Clone, Copy)]
pub struct FairnessGate {
    floor: f64,
    ceiling: f64,
}

impl Default for FairnessGate {
    fn default() -> Self {
        Self {
            floor: FAIRNESS_FLOOR,
            ceiling: FAIRNESS_CEILING,
        }
    }
}

impl FairnessGate {
    pub fn is_fair(&self, probability: f64) -> bool {
        self.floor < probability && probability < self.ceiling
    }
}

/// Maps ranked risk-raising factors onto ECOA adverse-action reasons.
#[derive(Debug, Clone, Copy)]
pub struct ReasonCodeMapper {
    threshold: f64,
    limit: usize,
}

impl Default for ReasonCodeMapper {
    fn default() -> Self {
        Self {
            threshold: ADVERSE_ACTION_THRESHOLD,
            limit: MAX_ADVERSE_REASONS,
        }
    }
}

impl ReasonCodeMapper {
    /// Empty unless `probability` exceeds the adverse-action threshold. Factors without a reason
    /// code are dropped after the top four are selected, so fewer than four may be returned.
    pub fn reasons(&self, probability: f64, factors: &[CausalFactor]) -> Vec<String> {
        if probability <= self.threshold {
            return Vec::new();
        }

        factors
            .iter()
            .filter(|factor| factor.direction == RiskDirection::IncreasesRisk)
            .take(self.limit)
            .filter_map(|factor| factor.feature.reason_code())
            .map(str::to_string)
            .collect()
    }
}
