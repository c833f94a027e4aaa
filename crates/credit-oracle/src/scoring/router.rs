use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, ScoringRequest};
use super::orchestrator::ScoringError;
use super::repository::{RepositoryError, ScoreRepository};
use super::service::{CreditScoringService, ScoringServiceError};

/// HTTP endpoints for scoring applications and reading stored scores.
pub fn scoring_router<R>(service: Arc<CreditScoringService<R>>) -> Router
where
    R: ScoreRepository + 'static,
{
    Router::new()
        .route("/api/v1/oracle/score", post(score_handler::<R>))
        .route(
            "/api/v1/oracle/scores/:application_id",
            get(stored_score_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<CreditScoringService<R>>>,
    payload: Result<axum::Json<ScoringRequest>, JsonRejection>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.score(request).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(mut payload) => {
                if let Some(fields) = payload.as_object_mut() {
                    fields.insert("status".to_string(), json!("scored"));
                }
                (StatusCode::OK, axum::Json(payload)).into_response()
            }
            Err(err) => {
                let payload = json!({
                    "error": err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
            }
        },
        Err(ScoringServiceError::Scoring(error @ ScoringError::MissingApplicationId)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn stored_score_handler<R>(
    State(service): State<Arc<CreditScoringService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(ScoringServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "score not found",
                "application_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
