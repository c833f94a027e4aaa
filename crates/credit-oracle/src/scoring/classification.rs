use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::knowledge::Feature;
use super::model::BASE_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    Low,
    Liquidity,
    Behavioral,
    Systemic,
    Structural,
}

impl RiskType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Liquidity => "liquidity",
            Self::Behavioral => "behavioral",
            Self::Systemic => "systemic",
            Self::Structural => "structural",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskClassification {
    pub risk_type: RiskType,
    pub severity: RiskSeverity,
}

/// Rule cascade naming the dominant source of risk. First matching rule wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier;

impl RiskClassifier {
    pub fn classify(&self, probability: f64, features: &FeatureVector) -> RiskClassification {
        RiskClassification {
            risk_type: self.risk_type(probability, features),
            severity: self.severity(probability),
        }
    }

    pub fn risk_type(&self, probability: f64, features: &FeatureVector) -> RiskType {
        if probability < BASE_RATE {
            RiskType::Low
        } else if features.get(Feature::CashFlowStress) > 0.4 {
            RiskType::Liquidity
        } else if features.get(Feature::GamblingAmount) > 0.3 {
            RiskType::Behavioral
        } else if features.get(Feature::MacroSectorStress) > 0.5 {
            RiskType::Systemic
        } else {
            RiskType::Structural
        }
    }

    pub fn severity(&self, probability: f64) -> RiskSeverity {
        if probability > 0.65 {
            RiskSeverity::Critical
        } else if probability > 0.40 {
            RiskSeverity::High
        } else if probability > 0.25 {
            RiskSeverity::Medium
        } else {
            RiskSeverity::Low
        }
    }
}
