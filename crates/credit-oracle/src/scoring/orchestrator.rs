use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::attribution::CausalAttributor;
use super::classification::RiskClassifier;
use super::compliance::{FairnessGate, ReasonCodeMapper};
use super::counterfactual::CounterfactualExplainer;
use super::domain::{ApplicationId, MacroContext, ScoringRequest};
use super::encoder::FeatureEncoder;
use super::knowledge::KNOWLEDGE_BASE_VERSION;
use super::model::ProbabilityModel;
use super::narrative::{NarrativeComposer, NarrativeContext};
use super::result::{ScoringResult, MODEL_VERSION};
use super::score::{score_from_probability, UncertaintyEstimator};
use super::trajectory::TrajectoryForecaster;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("application_id required")]
    MissingApplicationId,
    #[error("scoring pipeline failed: {0}")]
    Internal(String),
}

/// Single entry point composing every scoring stage.
///
/// Deterministic for a fixed `now` unless a narrative service is attached.
#[derive(Debug, Clone, Default)]
pub struct ScoringOrchestrator {
    model: ProbabilityModel,
    uncertainty: UncertaintyEstimator,
    attributor: CausalAttributor,
    explainer: CounterfactualExplainer,
    forecaster: TrajectoryForecaster,
    classifier: RiskClassifier,
    fairness: FairnessGate,
    reasons: ReasonCodeMapper,
    narrative: NarrativeComposer,
}

impl ScoringOrchestrator {
    pub fn new(narrative: NarrativeComposer) -> Self {
        Self {
            narrative,
            ..Self::default()
        }
    }

    pub fn narrative(&self) -> &NarrativeComposer {
        &self.narrative
    }

    /// Rejects a missing or blank application id.
    pub fn application_id(request: &ScoringRequest) -> Result<ApplicationId, ScoringError> {
        request
            .application_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| ApplicationId(id.to_string()))
            .ok_or(ScoringError::MissingApplicationId)
    }

    pub async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult, ScoringError> {
        self.score_at(request, Utc::now()).await
    }

    pub async fn score_at(
        &self,
        request: &ScoringRequest,
        now: DateTime<Utc>,
    ) -> Result<ScoringResult, ScoringError> {
        let started = Instant::now();
        let application_id = Self::application_id(request)?;

        let macro_context = MacroContext::resolve(&request.macro_context);
        let features = FeatureEncoder::at(now).encode(&request.features, &macro_context);

        let probability = self.model.probability(&features);
        if !probability.is_finite() {
            return Err(ScoringError::Internal(format!(
                "non-finite probability for application {}",
                application_id.0
            )));
        }

        let score = score_from_probability(probability);
        let interval = self.uncertainty.interval(probability);
        let causal_factors = self.attributor.attribute(&features);
        let counterfactuals = self.explainer.explain(&features, probability);
        let trajectory = self.forecaster.forecast(probability, &features);
        let classification = self.classifier.classify(probability, &features);
        let fair = self.fairness.is_fair(probability);
        let adverse_action_reasons = self.reasons.reasons(probability, &causal_factors);

        let outcome = self
            .narrative
            .compose(&NarrativeContext {
                score,
                risk_type: classification.risk_type,
                factors: &causal_factors,
                counterfactuals: &counterfactuals,
                trajectory: &trajectory,
                macro_context: &macro_context,
            })
            .await;
        let narrative_source = outcome.source();
        let narrative = outcome.into_narrative();

        let inference_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            application_id = %application_id.0,
            score,
            inference_ms,
            "application scored"
        );

        Ok(ScoringResult {
            score,
            probability,
            confidence_low: interval.low,
            confidence_high: interval.high,
            risk_type: classification.risk_type,
            risk_severity: classification.severity,
            fair,
            causal_factors,
            counterfactuals,
            trajectory,
            adverse_action_reasons,
            explanation: narrative.explanation,
            improvement_plan: narrative.improvement_plan,
            narrative_source,
            model_version: MODEL_VERSION.to_string(),
            knowledge_base_version: KNOWLEDGE_BASE_VERSION.to_string(),
            inference_ms,
        })
    }
}
