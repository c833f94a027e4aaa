use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::scoring::domain::ScoringRequest;
use crate::scoring::orchestrator::ScoringOrchestrator;
use crate::scoring::service::CreditScoringService;

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn score_route_returns_result_with_status() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/oracle/score",
            json!({
                "application_id": "app-42",
                "features": { "stated_income": "6200", "revolving_utilization": 0.2 },
                "macro_context": { "fed_funds_rate": 4.5 }
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "scored");
    assert_eq!(payload["model_version"], "oracle-v1.0.0");
    let score = payload["score"].as_u64().expect("numeric score");
    assert!((300..=850).contains(&score));
    assert!(payload["trajectory"]["month_6"].is_object());
    assert!(!payload["explanation"]
        .as_str()
        .expect("explanation text")
        .contains("elevated interest rates"));
}

#[tokio::test]
async fn score_route_rejects_missing_application_id() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/oracle/score",
            json!({ "features": { "stated_income": 5000 } }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "application_id required");
    assert!(repository.scored().is_empty());
}

#[tokio::test]
async fn null_and_mistyped_optional_sections_fall_back_to_defaults() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let baseline = router
        .clone()
        .oneshot(post_json(
            "/api/v1/oracle/score",
            json!({ "application_id": "app-50" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(baseline.status(), StatusCode::OK);
    let baseline = read_json_body(baseline).await;

    for body in [
        json!({ "application_id": "app-50", "macro_context": null }),
        json!({ "application_id": "app-50", "features": null }),
        json!({ "application_id": "app-50", "features": "garbage" }),
        json!({ "application_id": "app-50", "applicant_id": 7 }),
        json!({ "application_id": 50, "macro_context": [1, 2] }),
    ] {
        let response = router
            .clone()
            .oneshot(post_json("/api/v1/oracle/score", body.clone()))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK, "body {body}");
        let payload = read_json_body(response).await;
        assert_eq!(payload["score"], baseline["score"], "body {body}");
        assert_eq!(payload["probability"], baseline["probability"], "body {body}");
    }
}

#[tokio::test]
async fn unparseable_body_is_a_json_bad_request() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/oracle/score")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
    assert!(repository.scored().is_empty());
}

#[tokio::test]
async fn score_handler_survives_storage_outage() {
    let service = Arc::new(CreditScoringService::new(
        Arc::new(UnavailableRepository),
        ScoringOrchestrator::default(),
    ));

    let response = crate::scoring::router::score_handler::<UnavailableRepository>(
        State(service),
        Ok(axum::Json(ScoringRequest::for_application("app-7"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stored_score_route_returns_record() {
    let (service, _) = build_service();
    let (result, persistence) = service
        .score_at(stressed_request(), now())
        .await
        .expect("scores");
    persistence.await.expect("persistence completes");
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/oracle/scores/app-1001")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["application_id"], "app-1001");
    assert_eq!(payload["applicant_id"], "applicant-77");
    assert_eq!(payload["result"]["score"], u64::from(result.score));
}

#[tokio::test]
async fn stored_score_route_returns_not_found() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/oracle/scores/missing")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["application_id"], "missing");
}
