use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::domain::{ApplicantId, ApplicationId, ScoringRequest};
use super::orchestrator::{ScoringError, ScoringOrchestrator};
use super::repository::{RepositoryError, ScoreRecord, ScoreRepository};
use super::result::ScoringResult;

/// Scores requests and records results without holding up the caller.
pub struct CreditScoringService<R> {
    orchestrator: Arc<ScoringOrchestrator>,
    repository: Arc<R>,
}

impl<R> CreditScoringService<R>
where
    R: ScoreRepository + 'static,
{
    pub fn new(repository: Arc<R>, orchestrator: ScoringOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            repository,
        }
    }

    pub fn orchestrator(&self) -> &ScoringOrchestrator {
        &self.orchestrator
    }

    pub async fn score(&self, request: ScoringRequest) -> Result<ScoringResult, ScoringServiceError> {
        self.score_at(request, Utc::now())
            .await
            .map(|(result, _persistence)| result)
    }

    /// Score at a fixed instant. The returned handle resolves once persistence has been attempted;
    /// dropping it leaves the write running.
    pub async fn score_at(
        &self,
        request: ScoringRequest,
        now: DateTime<Utc>,
    ) -> Result<(ScoringResult, JoinHandle<()>), ScoringServiceError> {
        let application_id = ScoringOrchestrator::application_id(&request)?;
        info!(application_id = %application_id.0, "scoring request accepted");

        let result = self.orchestrator.score_at(&request, now).await?;

        let record = ScoreRecord {
            application_id,
            applicant_id: request
                .applicant_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| ApplicantId(id.to_string())),
            result: result.clone(),
            scored_at: now,
        };
        let persistence = dispatch_persistence(Arc::clone(&self.repository), record);

        Ok((result, persistence))
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<ScoreRecord, ScoringServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

pub(crate) fn dispatch_persistence<R>(repository: Arc<R>, record: ScoreRecord) -> JoinHandle<()>
where
    R: ScoreRepository + 'static,
{
    tokio::task::spawn_blocking(move || {
        let application_id = record.application_id.clone();
        if let Err(err) = repository.upsert(record) {
            warn!(application_id = %application_id.0, error = %err, "failed to store score");
            return;
        }
        if let Err(err) = repository.mark_application_scored(&application_id) {
            warn!(
                application_id = %application_id.0,
                error = %err,
                "failed to mark application scored"
            );
        }
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
