use crate::infra::{categories_from_keys, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use medcomp::config::AggregationConfig;
use medcomp::error::AppError;
use medcomp::workflows::compensation::{
    compensation_router, CompensationAggregator, CompensationInsights, CompensationReportService,
    CompensationReportSummary, PracticeCategory, SalaryCsvImporter,
};
use medcomp::workflows::store::CompensationStore;
use medcomp::workflows::submission::{submission_router, SubmissionSessions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct SalaryImportRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) categories: Vec<String>,
    #[serde(default)]
    pub(crate) top_locations: Option<usize>,
    #[serde(default)]
    pub(crate) include_records: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SalaryImportResponse {
    pub(crate) categories: Vec<PracticeCategory>,
    pub(crate) report: CompensationReportSummary,
    pub(crate) insights: CompensationInsights,
}

pub(crate) fn with_medcomp_routes<S>(
    reports: Arc<CompensationReportService<S>>,
    sessions: Arc<SubmissionSessions<S>>,
    aggregation: AggregationConfig,
) -> axum::Router
where
    S: CompensationStore + 'static,
{
    compensation_router(reports)
        .merge(submission_router(sessions))
        .route(
            "/api/v1/compensation/import",
            axum::routing::post(salary_import_endpoint),
        )
        .layer(Extension(aggregation))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Aggregate an uploaded CSV export without touching the store.
pub(crate) async fn salary_import_endpoint(
    Extension(aggregation): Extension<AggregationConfig>,
    Json(payload): Json<SalaryImportRequest>,
) -> Result<Json<SalaryImportResponse>, AppError> {
    let SalaryImportRequest {
        csv,
        categories,
        top_locations,
        include_records,
    } = payload;

    let categories = categories_from_keys(&categories, &aggregation.categories)?;
    let top_locations = match top_locations {
        Some(0) => {
            return Err(AppError::InvalidInput(
                "top_locations must be at least 1".to_string(),
            ))
        }
        Some(value) => value,
        None => aggregation.top_locations,
    };

    let rows = SalaryCsvImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let view = CompensationAggregator::new(categories.clone()).aggregate(&rows);
    let mut report = view.summary(top_locations);
    let insights = report.insights(&view);
    if !include_records {
        report.records.clear();
    }

    Ok(Json(SalaryImportResponse {
        categories,
        report,
        insights,
    }))
}
