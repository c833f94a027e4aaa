//! Fixed causal priors plus the label and adverse-action dictionaries.
//!
//! The tables are domain priors rather than fitted parameters. Any change to an edge, label, or
//! reason string must bump [`KNOWLEDGE_BASE_VERSION`] so stored results stay traceable.

use serde::{Deserialize, Serialize};

use Feature as F;
use RiskDirection::{DecreasesRisk, IncreasesRisk};

pub const KNOWLEDGE_BASE_VERSION: &str = "oracle-causal-priors-v1";

/// Every name the feature encoder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    RevolvingUtilization,
    #[serde(rename = "missed_payments_12m")]
    MissedPayments12m,
    #[serde(rename = "missed_payments_24m")]
    MissedPayments24m,
    DerogatoryMarks,
    #[serde(rename = "inquiries_6m")]
    Inquiries6m,
    OldestAccountNorm,
    TotalAccountsNorm,
    IncomeNorm,
    IncomeVerified,
    EmploymentMonthsNorm,
    DtiRatio,
    CashFlowStress,
    IncomeStability,
    LoanPaymentRegularity,
    GamblingAmount,
    AtmFrequency,
    SpendVelocity,
    MacroFedRate,
    MacroCpi,
    MacroUnemployment,
    MacroSectorStress,
}

impl Feature {
    pub const fn ordered() -> [Self; 21] {
        [
            Self::RevolvingUtilization,
            Self::MissedPayments12m,
            Self::MissedPayments24m,
            Self::DerogatoryMarks,
            Self::Inquiries6m,
            Self::OldestAccountNorm,
            Self::TotalAccountsNorm,
            Self::IncomeNorm,
            Self::IncomeVerified,
            Self::EmploymentMonthsNorm,
            Self::DtiRatio,
            Self::CashFlowStress,
            Self::IncomeStability,
            Self::LoanPaymentRegularity,
            Self::GamblingAmount,
            Self::AtmFrequency,
            Self::SpendVelocity,
            Self::MacroFedRate,
            Self::MacroCpi,
            Self::MacroUnemployment,
            Self::MacroSectorStress,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::RevolvingUtilization => "revolving_utilization",
            Self::MissedPayments12m => "missed_payments_12m",
            Self::MissedPayments24m => "missed_payments_24m",
            Self::DerogatoryMarks => "derogatory_marks",
            Self::Inquiries6m => "inquiries_6m",
            Self::OldestAccountNorm => "oldest_account_norm",
            Self::TotalAccountsNorm => "total_accounts_norm",
            Self::IncomeNorm => "income_norm",
            Self::IncomeVerified => "income_verified",
            Self::EmploymentMonthsNorm => "employment_months_norm",
            Self::DtiRatio => "dti_ratio",
            Self::CashFlowStress => "cash_flow_stress",
            Self::IncomeStability => "income_stability",
            Self::LoanPaymentRegularity => "loan_payment_regularity",
            Self::GamblingAmount => "gambling_amount",
            Self::AtmFrequency => "atm_frequency",
            Self::SpendVelocity => "spend_velocity",
            Self::MacroFedRate => "macro_fed_rate",
            Self::MacroCpi => "macro_cpi",
            Self::MacroUnemployment => "macro_unemployment",
            Self::MacroSectorStress => "macro_sector_stress",
        }
    }

    /// Human-readable label, falling back to the wire name for unlabeled features.
    pub fn label(self) -> &'static str {
        FACTOR_LABELS
            .iter()
            .find(|(feature, _)| *feature == self)
            .map(|(_, label)| *label)
            .unwrap_or_else(|| self.name())
    }

    /// ECOA adverse-action reason, when one exists.
    pub fn reason_code(self) -> Option<&'static str> {
        ECOA_REASONS
            .iter()
            .find(|(feature, _)| *feature == self)
            .map(|(_, reason)| *reason)
    }
}

/// Sign of a causal edge's effect on default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDirection {
    IncreasesRisk,
    DecreasesRisk,
}

impl RiskDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::IncreasesRisk => "increases_risk",
            Self::DecreasesRisk => "decreases_risk",
        }
    }
}

/// Node an edge points at. Only default probability is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalTarget {
    Probability,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CausalEdge {
    pub cause: Feature,
    pub target: CausalTarget,
    pub direction: RiskDirection,
    pub strength: f64,
}

impl CausalEdge {
    const fn new(cause: Feature, direction: RiskDirection, strength: f64) -> Self {
        Self {
            cause,
            target: CausalTarget::Probability,
            direction,
            strength,
        }
    }
}

/// Versioned, read-only view over the causal priors.
#[derive(Debug, Clone, Copy)]
pub struct CausalKnowledgeBase {
    pub version: &'static str,
    pub edges: &'static [CausalEdge],
}

impl CausalKnowledgeBase {
    /// The process-wide knowledge base.
    pub fn standard() -> &'static Self {
        &STANDARD_KNOWLEDGE_BASE
    }

    pub fn edge_for(&self, feature: Feature) -> Option<&CausalEdge> {
        self.edges.iter().find(|edge| edge.cause == feature)
    }

    pub fn edges_targeting(&self, target: CausalTarget) -> impl Iterator<Item = &CausalEdge> {
        self.edges.iter().filter(move |edge| edge.target == target)
    }
}

static STANDARD_KNOWLEDGE_BASE: CausalKnowledgeBase = CausalKnowledgeBase {
    version: KNOWLEDGE_BASE_VERSION,
    edges: &CAUSAL_EDGES,
};

pub const CAUSAL_EDGES: [CausalEdge; 12] = [
    CausalEdge::new(F::RevolvingUtilization, IncreasesRisk, 0.74),
    CausalEdge::new(F::MissedPayments12m, IncreasesRisk, 0.88),
    CausalEdge::new(F::DerogatoryMarks, IncreasesRisk, 0.91),
    CausalEdge::new(F::GamblingAmount, IncreasesRisk, 0.55),
    CausalEdge::new(F::CashFlowStress, IncreasesRisk, 0.77),
    CausalEdge::new(F::DtiRatio, IncreasesRisk, 0.65),
    CausalEdge::new(F::Inquiries6m, IncreasesRisk, 0.42),
    CausalEdge::new(F::AtmFrequency, IncreasesRisk, 0.25),
    CausalEdge::new(F::IncomeNorm, DecreasesRisk, 0.58),
    CausalEdge::new(F::IncomeStability, DecreasesRisk, 0.64),
    CausalEdge::new(F::LoanPaymentRegularity, DecreasesRisk, 0.68),
    CausalEdge::new(F::OldestAccountNorm, DecreasesRisk, 0.55),
];

pub const FACTOR_LABELS: [(Feature, &str); 16] = [
    (F::RevolvingUtilization, "Credit utilization ratio"),
    (F::MissedPayments12m, "Recent missed payments"),
    (F::MissedPayments24m, "Missed payments (24 months)"),
    (F::DerogatoryMarks, "Derogatory marks on record"),
    (F::GamblingAmount, "High-risk discretionary spending"),
    (F::CashFlowStress, "Cash flow stress indicators"),
    (F::DtiRatio, "Debt-to-income ratio"),
    (F::Inquiries6m, "Recent hard inquiries"),
    (F::IncomeNorm, "Income level"),
    (F::IncomeStability, "Income stability"),
    (F::LoanPaymentRegularity, "Loan payment consistency"),
    (F::OldestAccountNorm, "Credit history length"),
    (F::IncomeVerified, "Income verification status"),
    (F::SpendVelocity, "Spending acceleration"),
    (F::AtmFrequency, "Cash withdrawal frequency"),
    (F::TotalAccountsNorm, "Number of credit accounts"),
];

pub const ECOA_REASONS: [(Feature, &str); 10] = [
    (
        F::RevolvingUtilization,
        "Proportion of balances to credit limits is too high",
    ),
    (
        F::MissedPayments12m,
        "Delinquent past or present credit obligations",
    ),
    (
        F::DerogatoryMarks,
        "Derogatory public record or collection filed",
    ),
    (F::Inquiries6m, "Too many inquiries in the last 12 months"),
    (F::DtiRatio, "Ratio of debt to income"),
    (F::IncomeNorm, "Insufficient income"),
    (F::CashFlowStress, "Insufficient balance in deposit accounts"),
    (
        F::GamblingAmount,
        "Proportion of income dedicated to discretionary expenses",
    ),
    (F::IncomeStability, "Insufficient length of employment"),
    (
        F::LoanPaymentRegularity,
        "Payment history shows inconsistent or late payments",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_table_has_twelve_unique_probability_edges() {
        let kb = CausalKnowledgeBase::standard();
        assert_eq!(kb.version, KNOWLEDGE_BASE_VERSION);
        assert_eq!(kb.edges.len(), 12);
        assert_eq!(kb.edges_targeting(CausalTarget::Probability).count(), 12);

        let causes: HashSet<Feature> = kb.edges.iter().map(|edge| edge.cause).collect();
        assert_eq!(causes.len(), 12);
        assert!(kb
            .edges
            .iter()
            .all(|edge| edge.strength > 0.0 && edge.strength <= 1.0));
    }

    #[test]
    fn every_edge_cause_has_a_label() {
        for edge in CausalKnowledgeBase::standard().edges {
            assert_ne!(edge.cause.label(), edge.cause.name(), "{:?}", edge.cause);
        }
    }

    #[test]
    fn reason_codes_cover_ten_causal_features() {
        let kb = CausalKnowledgeBase::standard();
        let mapped = kb
            .edges
            .iter()
            .filter(|edge| edge.cause.reason_code().is_some())
            .count();
        assert_eq!(mapped, 10);
        assert_eq!(Feature::AtmFrequency.reason_code(), None);
        assert_eq!(
            Feature::RevolvingUtilization.reason_code(),
            Some("Proportion of balances to credit limits is too high")
        );
    }

    #[test]
    fn feature_names_match_serde_representation() {
        for feature in Feature::ordered() {
            let encoded = serde_json::to_value(feature).expect("serializes");
            assert_eq!(encoded, serde_json::Value::String(feature.name().to_string()));
        }
    }
}
