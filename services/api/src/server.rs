use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCompensationStore};
use crate::routes::with_medcomp_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use medcomp::config::AppConfig;
use medcomp::error::AppError;
use medcomp::telemetry;
use medcomp::workflows::compensation::CompensationReportService;
use medcomp::workflows::submission::{SubmissionService, SubmissionSessions};
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

    let store = Arc::new(InMemoryCompensationStore::seeded());
    let reports = Arc::new(CompensationReportService::new(
        store.clone(),
        &config.aggregation,
    ));
    let sessions = Arc::new(SubmissionSessions::new(SubmissionService::new(store)));

    let app = with_medcomp_routes(reports, sessions, config.aggregation.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        categories = config.aggregation.categories.len(),
        "medical compensation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
