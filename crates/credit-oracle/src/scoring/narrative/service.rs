use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::NarrativeConfig;
use crate::scoring::classification::RiskType;
use crate::scoring::trajectory::Trend;

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 350;

/// One recommended action as presented to the narrative service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub description: String,
    pub score_improvement: u16,
}

/// Everything the enhancement service is allowed to see. No probabilities or raw features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub score: u16,
    pub risk_type: RiskType,
    pub top_actions: Vec<ActionSummary>,
    pub twelve_month_trend: Trend,
    pub twelve_month_delta: i32,
}

impl NarrativeRequest {
    pub fn prompt(&self) -> String {
        let actions = if self.top_actions.is_empty() {
            "maintain current behavior".to_string()
        } else {
            self.top_actions
                .iter()
                .map(|action| format!("{} (+{}pts)", action.description, action.score_improvement))
                .collect::<Vec<_>>()
                .join("; ")
        };

        format!(
            "Credit score: {score}/850. Risk type: {risk}. Top actions: {actions}. \
             12-month forecast: {trend} by {delta} pts.\n\n\
             Write 2 short paragraphs: (1) a warm, clear plain-English explanation of this result, \
             (2) the single most impactful next step. Never mention the word \"default\", raw \
             probability numbers, or internal model details. Return ONLY the two paragraphs \
             separated by a blank line.",
            score = self.score,
            risk = self.risk_type.label(),
            trend = self.twelve_month_trend.label(),
            delta = self.twelve_month_delta.unsigned_abs(),
        )
    }
}

/// Text returned by a successful enhancement. `improvement_plan` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeText {
    pub explanation: String,
    pub improvement_plan: String,
}

impl NarrativeText {
    pub fn is_blank(&self) -> bool {
        self.explanation.trim().is_empty() && self.improvement_plan.trim().is_empty()
    }

    /// Splits on blank lines: first paragraph explains, second recommends.
    pub fn from_paragraphs(content: &str) -> Option<Self> {
        let mut paragraphs = content
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty());

        let explanation = paragraphs.next()?.to_string();
        let improvement_plan = paragraphs.next().unwrap_or_default().to_string();
        Some(Self {
            explanation,
            improvement_plan,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative transport failed: {0}")]
    Transport(String),
    #[error("narrative service responded with status {0}")]
    Status(u16),
    #[error("narrative response malformed: {0}")]
    Malformed(String),
    #[error("narrative service returned no text")]
    Empty,
}

/// External capability that may rewrite the template narrative.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn enhance(&self, request: &NarrativeRequest) -> Result<NarrativeText, NarrativeError>;
}

/// Chat-completions client for the enhancement service.
pub struct HttpNarrativeService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpNarrativeService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_config(config: &NarrativeConfig) -> Result<Option<Self>, NarrativeError> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        Self::new(
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
            config.timeout,
        )
        .map(Some)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl NarrativeService for HttpNarrativeService {
    async fn enhance(&self, request: &NarrativeRequest) -> Result<NarrativeText, NarrativeError> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "messages": [{ "role": "user", "content": request.prompt() }],
        });

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NarrativeError::Status(status.as_u16()));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|err| NarrativeError::Malformed(err.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .as_deref()
            .and_then(NarrativeText::from_paragraphs)
            .ok_or(NarrativeError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NarrativeRequest {
        NarrativeRequest {
            score: 642,
            risk_type: RiskType::Liquidity,
            top_actions: vec![ActionSummary {
                description: "Build emergency fund to cover monthly shortfalls".to_string(),
                score_improvement: 24,
            }],
            twelve_month_trend: Trend::Deteriorating,
            twelve_month_delta: -11,
        }
    }

    #[test]
    fn prompt_carries_summary_without_probabilities() {
        let prompt = request().prompt();
        assert!(prompt.contains("Credit score: 642/850"));
        assert!(prompt.contains("Risk type: liquidity"));
        assert!(prompt.contains("Build emergency fund to cover monthly shortfalls (+24pts)"));
        assert!(prompt.contains("deteriorating by 11 pts"));
    }

    #[test]
    fn prompt_without_actions_suggests_holding_steady() {
        let mut request = request();
        request.top_actions.clear();
        assert!(request.prompt().contains("Top actions: maintain current behavior."));
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = NarrativeText::from_paragraphs("\n\nFirst part.\n\n\n\nSecond part.\n\nThird.")
            .expect("has text");
        assert_eq!(text.explanation, "First part.");
        assert_eq!(text.improvement_plan, "Second part.");

        let single = NarrativeText::from_paragraphs("Only one.").expect("has text");
        assert_eq!(single.improvement_plan, "");

        assert_eq!(NarrativeText::from_paragraphs("  \n\n  "), None);
    }

    #[test]
    fn unconfigured_endpoint_builds_no_client() {
        let config = NarrativeConfig::default();
        let service = HttpNarrativeService::from_config(&config).expect("builds");
        assert!(service.is_none());
    }
}
