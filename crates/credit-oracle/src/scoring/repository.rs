use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantId, ApplicationId};
use super::result::ScoringResult;

/// Stored scoring outcome, keyed by application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub application_id: ApplicationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<ApplicantId>,
    pub result: ScoringResult,
    pub scored_at: DateTime<Utc>,
}

/// Storage abstraction for scored applications.
pub trait ScoreRepository: Send + Sync {
    /// Insert or replace the record for `record.application_id`.
    fn upsert(&self, record: ScoreRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ScoreRecord>, RepositoryError>;
    /// Flag the parent application as scored.
    fn mark_application_scored(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
