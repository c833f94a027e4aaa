//! Explainable credit scoring.
//!
//! Raw application data is encoded into a [`FeatureVector`], pushed through a fixed-weight causal
//! model, and explained through attribution, counterfactual actions, a trajectory forecast, risk
//! classification, adverse-action reasons, and a narrative. [`ScoringOrchestrator`] wires the
//! stages; [`CreditScoringService`] adds persistence and [`scoring_router`] exposes it over HTTP.

pub mod attribution;
pub mod classification;
pub mod compliance;
pub mod counterfactual;
pub mod domain;
pub mod encoder;
pub mod features;
pub mod knowledge;
pub mod model;
pub mod narrative;
pub mod orchestrator;
pub mod repository;
pub mod result;
pub mod router;
pub mod score;
pub mod service;
pub mod trajectory;

#[cfg(test)]
mod tests;

pub use attribution::{CausalAttributor, CausalFactor};
pub use classification::{RiskClassification, RiskClassifier, RiskSeverity, RiskType};
pub use compliance::{FairnessGate, ReasonCodeMapper};
pub use counterfactual::{Counterfactual, CounterfactualExplainer, Feasibility, Intervention};
pub use domain::{
    parse_timestamp, ApplicantId, ApplicationFeatures, ApplicationId, MacroContext,
    MacroContextOverrides, ScoringRequest, Transaction, TransactionKind,
};
pub use encoder::FeatureEncoder;
pub use features::FeatureVector;
pub use knowledge::{
    CausalEdge, CausalKnowledgeBase, CausalTarget, Feature, RiskDirection, KNOWLEDGE_BASE_VERSION,
};
pub use model::{clamp_probability, ProbabilityModel, BASE_RATE};
pub use narrative::{
    HttpNarrativeService, Narrative, NarrativeComposer, NarrativeError, NarrativeOutcome,
    NarrativeRequest, NarrativeService, NarrativeSource, NarrativeText,
};
pub use orchestrator::{ScoringError, ScoringOrchestrator};
pub use repository::{RepositoryError, ScoreRecord, ScoreRepository};
pub use result::{ScoringResult, MODEL_VERSION};
pub use router::scoring_router;
pub use score::{score_from_probability, ConfidenceInterval, UncertaintyEstimator};
pub use service::{CreditScoringService, ScoringServiceError};
pub use trajectory::{Trajectory, TrajectoryForecaster, TrajectoryPoint, Trend};
