use std::sync::Arc;

use super::common::*;
use crate::scoring::classification::RiskType;
use crate::scoring::narrative::{NarrativeOutcome, NarrativeSource};
use crate::scoring::orchestrator::ScoringOrchestrator;
use crate::scoring::trajectory::Trend;

#[tokio::test]
async fn enhanced_text_replaces_template() {
    let narrative = Arc::new(ScriptedNarrative::replying(
        "You are managing a lot right now.",
        "Start by paying down your largest balance.",
    ));
    let orchestrator = ScoringOrchestrator::new(composer_with(narrative.clone()));

    let result = orchestrator
        .score_at(&stressed_request(), now())
        .await
        .expect("scores");

    assert_eq!(result.narrative_source, NarrativeSource::Enhanced);
    assert_eq!(result.explanation, "You are managing a lot right now.");
    assert_eq!(
        result.improvement_plan,
        "Start by paying down your largest balance."
    );

    let requests = narrative.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.score, result.score);
    assert_eq!(request.risk_type, RiskType::Liquidity);
    assert_eq!(request.top_actions.len(), 2);
    assert_eq!(request.top_actions[0].score_improvement, 80);
    assert_eq!(request.twelve_month_trend, Trend::Improving);
    assert_eq!(request.twelve_month_delta, 13);
}

#[tokio::test]
async fn empty_improvement_plan_keeps_template_plan() {
    let narrative = Arc::new(ScriptedNarrative::replying("Plain explanation.", ""));
    let orchestrator = ScoringOrchestrator::new(composer_with(narrative));

    let result = orchestrator
        .score_at(&stressed_request(), now())
        .await
        .expect("scores");

    assert_eq!(result.narrative_source, NarrativeSource::Enhanced);
    assert_eq!(result.explanation, "Plain explanation.");
    assert!(result.improvement_plan.starts_with("Top action: "));
}

#[tokio::test]
async fn service_failure_falls_back_to_template() {
    let template = ScoringOrchestrator::default()
        .score_at(&stressed_request(), now())
        .await
        .expect("scores");

    let failing = Arc::new(ScriptedNarrative::default());
    let result = ScoringOrchestrator::new(composer_with(failing.clone()))
        .score_at(&stressed_request(), now())
        .await
        .expect("scores despite narrative failure");

    assert_eq!(failing.requests().len(), 1);
    assert_eq!(result.narrative_source, NarrativeSource::Template);
    assert_eq!(result.without_timing(), template.without_timing());
}

#[tokio::test]
async fn blank_reply_falls_back_to_template() {
    let blank = Arc::new(ScriptedNarrative::replying("  ", ""));
    let result = ScoringOrchestrator::new(composer_with(blank))
        .score_at(&stressed_request(), now())
        .await
        .expect("scores");

    assert_eq!(result.narrative_source, NarrativeSource::Template);
    assert!(result.explanation.starts_with("Your credit score of 708"));
}

#[tokio::test]
async fn stalled_service_is_cut_off_by_timeout() {
    let orchestrator = ScoringOrchestrator::new(composer_with(Arc::new(StalledNarrative)));

    let started = std::time::Instant::now();
    let result = orchestrator
        .score_at(&stressed_request(), now())
        .await
        .expect("scores");

    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(result.narrative_source, NarrativeSource::Template);
    assert_ne!(result.explanation, "too late");
}

#[test]
fn outcome_tag_tracks_source() {
    let narrative = crate::scoring::narrative::Narrative {
        explanation: "text".to_string(),
        improvement_plan: String::new(),
    };
    let template = NarrativeOutcome::Template(narrative.clone());
    let enhanced = NarrativeOutcome::Enhanced(narrative.clone());

    assert_eq!(template.source(), NarrativeSource::Template);
    assert_eq!(enhanced.source(), NarrativeSource::Enhanced);
    assert_eq!(enhanced.narrative(), &narrative);
}
