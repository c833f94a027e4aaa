use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::scoring::domain::{
    ApplicationFeatures, ApplicationId, ScoringRequest, Transaction,
};
use crate::scoring::narrative::{
    NarrativeComposer, NarrativeError, NarrativeRequest, NarrativeService, NarrativeText,
};
use crate::scoring::repository::{RepositoryError, ScoreRecord, ScoreRepository};
use crate::scoring::{scoring_router, CreditScoringService, ScoringOrchestrator};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - chrono::Duration::days(days)
}

pub(super) fn request_with(features: ApplicationFeatures) -> ScoringRequest {
    ScoringRequest {
        application_id: Some("app-1001".to_string()),
        applicant_id: Some("applicant-77".to_string()),
        features,
        ..ScoringRequest::default()
    }
}

/// Every month overspent, heavy balances, recent delinquencies and gambling.
pub(super) fn stressed_features() -> ApplicationFeatures {
    let mut transactions = Vec::new();
    for month in 0..12 {
        transactions.push(Transaction::credit(days_ago(30 * month + 2), 3_000.0, "salary"));
        transactions.push(Transaction::debit(days_ago(30 * month + 3), 4_000.0, "rent"));
    }
    transactions.push(Transaction::debit(days_ago(10), 2_500.0, "gambling"));

    ApplicationFeatures {
        transactions,
        stated_income: Some(3_000.0),
        total_balance: Some(200_000.0),
        missed_payments_12m: Some(8.0),
        derogatory_marks: Some(2.0),
        inquiries_6m: Some(6.0),
        revolving_utilization: Some(0.95),
        ..ApplicationFeatures::default()
    }
}

pub(super) fn stressed_request() -> ScoringRequest {
    request_with(stressed_features())
}

#[derive(Default, Clone)]
pub(super) struct MemoryScoreRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ScoreRecord>>>,
    pub(super) scored: Arc<Mutex<Vec<ApplicationId>>>,
}

impl MemoryScoreRepository {
    pub(super) fn scored(&self) -> Vec<ApplicationId> {
        self.scored.lock().expect("repository mutex poisoned").clone()
    }
}

impl ScoreRepository for MemoryScoreRepository {
    fn upsert(&self, record: ScoreRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn mark_application_scored(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        self.scored
            .lock()
            .expect("repository mutex poisoned")
            .push(id.clone());
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl ScoreRepository for UnavailableRepository {
    fn upsert(&self, _record: ScoreRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn mark_application_scored(&self, _id: &ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Narrative stub returning fixed text and recording what it was asked.
#[derive(Default)]
pub(super) struct ScriptedNarrative {
    pub(super) reply: Option<NarrativeText>,
    pub(super) requests: Mutex<Vec<NarrativeRequest>>,
}

impl ScriptedNarrative {
    pub(super) fn replying(explanation: &str, improvement_plan: &str) -> Self {
        Self {
            reply: Some(NarrativeText {
                explanation: explanation.to_string(),
                improvement_plan: improvement_plan.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<NarrativeRequest> {
        self.requests.lock().expect("narrative mutex poisoned").clone()
    }
}

#[async_trait]
impl NarrativeService for ScriptedNarrative {
    async fn enhance(&self, request: &NarrativeRequest) -> Result<NarrativeText, NarrativeError> {
        self.requests
            .lock()
            .expect("narrative mutex poisoned")
            .push(request.clone());
        self.reply.clone().ok_or(NarrativeError::Status(503))
    }
}

pub(super) struct StalledNarrative;

#[async_trait]
impl NarrativeService for StalledNarrative {
    async fn enhance(&self, _request: &NarrativeRequest) -> Result<NarrativeText, NarrativeError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(NarrativeText {
            explanation: "too late".to_string(),
            improvement_plan: String::new(),
        })
    }
}

pub(super) fn composer_with(service: Arc<dyn NarrativeService>) -> NarrativeComposer {
    NarrativeComposer::with_service(service, Duration::from_millis(50))
}

pub(super) fn build_service() -> (
    CreditScoringService<MemoryScoreRepository>,
    Arc<MemoryScoreRepository>,
) {
    let repository = Arc::new(MemoryScoreRepository::default());
    let service = CreditScoringService::new(repository.clone(), ScoringOrchestrator::default());
    (service, repository)
}

pub(super) fn router_with_service(
    service: CreditScoringService<MemoryScoreRepository>,
) -> Router {
    scoring_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
