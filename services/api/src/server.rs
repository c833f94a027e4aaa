use crate::cli::ServeArgs;
use crate::infra::{narrative_composer, AppState, InMemoryScoreRepository};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_oracle::config::AppConfig;
use credit_oracle::error::AppError;
use credit_oracle::scoring::{CreditScoringService, ScoringOrchestrator};
use credit_oracle::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryScoreRepository::default());
    let orchestrator = ScoringOrchestrator::new(narrative_composer(&config.narrative)?);
    let scoring_service = Arc::new(CreditScoringService::new(repository, orchestrator));

    let app = with_scoring_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        narrative_enhanced = config.narrative.enabled(),
        "credit oracle ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
