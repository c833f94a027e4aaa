use crate::scoring::attribution::CausalFactor;
use crate::scoring::counterfactual::Counterfactual;
use crate::scoring::domain::MacroContext;
use crate::scoring::knowledge::RiskDirection;

use super::Narrative;

const RATE_CAVEAT_THRESHOLD: f64 = 5.0;
const MAX_RISK_LABELS: usize = 2;

/// Score bands used to pick the opening sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    LowRisk,
    MediumRisk,
    HighRisk,
    VeryHighRisk,
}

impl ScoreTier {
    pub fn for_score(score: u16) -> Self {
        if score >= 720 {
            Self::LowRisk
        } else if score >= 650 {
            Self::MediumRisk
        } else if score >= 580 {
            Self::HighRisk
        } else {
            Self::VeryHighRisk
        }
    }

    fn opening(self, score: u16) -> String {
        match self {
            Self::LowRisk => format!(
                "Your credit score of {score} reflects low credit risk. You are likely to qualify \
                 for competitive rates and terms."
            ),
            Self::MediumRisk => format!(
                "Your credit score of {score} reflects moderate credit risk. You qualify for most \
                 credit products, though not always at the best rates."
            ),
            Self::HighRisk => format!(
                "Your credit score of {score} indicates elevated credit risk that may limit approval \
                 options or lead to higher interest rates."
            ),
            Self::VeryHighRisk => format!(
                "Your credit score of {score} indicates very high credit risk. Focused effort on the \
                 actions below can lead to meaningful improvement."
            ),
        }
    }
}

/// Deterministic narrative built only from the computed result.
pub fn compose(
    score: u16,
    factors: &[CausalFactor],
    counterfactuals: &[Counterfactual],
    macro_context: &MacroContext,
) -> Narrative {
    Narrative {
        explanation: explanation(score, factors, macro_context),
        improvement_plan: improvement_plan(counterfactuals),
    }
}

fn explanation(score: u16, factors: &[CausalFactor], macro_context: &MacroContext) -> String {
    let mut text = ScoreTier::for_score(score).opening(score);

    let risk_labels: Vec<String> = factors
        .iter()
        .filter(|factor| factor.direction == RiskDirection::IncreasesRisk)
        .take(MAX_RISK_LABELS)
        .map(|factor| factor.label.to_lowercase())
        .collect();
    match risk_labels.as_slice() {
        [] => {}
        [only] => text.push_str(&format!(" The primary factor affecting your score is {only}.")),
        [first, second, ..] => text.push_str(&format!(
            " The primary factors affecting your score are {first} and {second}."
        )),
    }

    if let Some(protective) = factors
        .iter()
        .find(|factor| factor.direction == RiskDirection::DecreasesRisk)
    {
        text.push_str(&format!(
            " Working in your favor: {}.",
            protective.label.to_lowercase()
        ));
    }

    if macro_context.fed_funds_rate > RATE_CAVEAT_THRESHOLD {
        text.push_str(
            " Note: elevated interest rates are affecting credit assessments broadly, so keeping \
             utilization low matters more than usual.",
        );
    }

    text
}

fn improvement_plan(counterfactuals: &[Counterfactual]) -> String {
    counterfactuals
        .first()
        .map(|best| {
            format!(
                "Top action: {}. This could improve your score by approximately {} points within {}.",
                best.description, best.score_improvement, best.timeframe
            )
        })
        .unwrap_or_default()
}
