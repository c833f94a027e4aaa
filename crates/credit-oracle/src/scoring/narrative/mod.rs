//! Explanation and improvement-plan text.
//!
//! The template path always runs. When a [`NarrativeService`] is configured its output may
//! replace the template text; any error, timeout, or empty reply keeps the template.

pub mod service;
pub mod templates;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::attribution::CausalFactor;
use super::classification::RiskType;
use super::counterfactual::Counterfactual;
use super::domain::MacroContext;
use super::trajectory::Trajectory;

pub use service::{
    ActionSummary, HttpNarrativeService, NarrativeError, NarrativeRequest, NarrativeService,
    NarrativeText,
};

const MAX_PROMPT_ACTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub explanation: String,
    pub improvement_plan: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Template,
    Enhanced,
}

/// Which path produced the final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeOutcome {
    Template(Narrative),
    Enhanced(Narrative),
}

impl NarrativeOutcome {
    pub fn source(&self) -> NarrativeSource {
        match self {
            Self::Template(_) => NarrativeSource::Template,
            Self::Enhanced(_) => NarrativeSource::Enhanced,
        }
    }

    pub fn narrative(&self) -> &Narrative {
        match self {
            Self::Template(narrative) | Self::Enhanced(narrative) => narrative,
        }
    }

    pub fn into_narrative(self) -> Narrative {
        match self {
            Self::Template(narrative) | Self::Enhanced(narrative) => narrative,
        }
    }
}

/// Computed pieces the narrative is written from.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub score: u16,
    pub risk_type: RiskType,
    pub factors: &'a [CausalFactor],
    pub counterfactuals: &'a [Counterfactual],
    pub trajectory: &'a Trajectory,
    pub macro_context: &'a MacroContext,
}

impl NarrativeContext<'_> {
    pub fn request(&self) -> NarrativeRequest {
        NarrativeRequest {
            score: self.score,
            risk_type: self.risk_type,
            top_actions: self
                .counterfactuals
                .iter()
                .take(MAX_PROMPT_ACTIONS)
                .map(|counterfactual| ActionSummary {
                    description: counterfactual.description.clone(),
                    score_improvement: counterfactual.score_improvement,
                })
                .collect(),
            twelve_month_trend: self.trajectory.month_12.trend,
            twelve_month_delta: self.trajectory.month_12.score_delta,
        }
    }
}

#[derive(Clone)]
pub struct NarrativeComposer {
    service: Option<Arc<dyn NarrativeService>>,
    timeout: Duration,
}

impl fmt::Debug for NarrativeComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeComposer")
            .field("enhanced", &self.service.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for NarrativeComposer {
    fn default() -> Self {
        Self::template_only()
    }
}

impl NarrativeComposer {
    pub fn template_only() -> Self {
        Self {
            service: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_service(service: Arc<dyn NarrativeService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    pub fn is_enhanced(&self) -> bool {
        self.service.is_some()
    }

    pub fn template(&self, context: &NarrativeContext<'_>) -> Narrative {
        templates::compose(
            context.score,
            context.factors,
            context.counterfactuals,
            context.macro_context,
        )
    }

    pub async fn compose(&self, context: &NarrativeContext<'_>) -> NarrativeOutcome {
        let template = self.template(context);
        let Some(service) = &self.service else {
            return NarrativeOutcome::Template(template);
        };

        let request = context.request();
        match tokio::time::timeout(self.timeout, service.enhance(&request)).await {
            Ok(Ok(text)) if text.is_blank() => {
                warn!("narrative enhancement returned no text; using template");
                NarrativeOutcome::Template(template)
            }
            Ok(Ok(text)) => {
                debug!(score = context.score, "narrative enhanced");
                NarrativeOutcome::Enhanced(merge(template, text))
            }
            Ok(Err(err)) => {
                warn!(error = %err, "narrative enhancement failed; using template");
                NarrativeOutcome::Template(template)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "narrative enhancement timed out; using template"
                );
                NarrativeOutcome::Template(template)
            }
        }
    }
}

/// Non-empty service text wins field by field.
fn merge(template: Narrative, text: NarrativeText) -> Narrative {
    let explanation = if text.explanation.trim().is_empty() {
        template.explanation
    } else {
        text.explanation
    };
    let improvement_plan = if text.improvement_plan.trim().is_empty() {
        template.improvement_plan
    } else {
        text.improvement_plan
    };
    Narrative {
        explanation,
        improvement_plan,
    }
}
