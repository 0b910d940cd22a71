use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::service::{CompensationReportService, ReportState};
use crate::workflows::store::{CompensationStore, SalaryQuery, StoreError};

/// Router builder exposing report and lookup endpoints.
pub fn compensation_router<S>(service: Arc<CompensationReportService<S>>) -> Router
where
    S: CompensationStore + 'static,
{
    Router::new()
        .route("/api/v1/compensation/report", post(report_handler::<S>))
        .route("/api/v1/specialties", get(specialties_handler::<S>))
        .route(
            "/api/v1/specialties/:specialty_id/subspecialties",
            get(subspecialties_handler::<S>),
        )
        .route(
            "/api/v1/categories/:category_id/positions",
            get(positions_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<CompensationReportService<S>>>,
    axum::Json(query): axum::Json<SalaryQuery>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match service.report(&query) {
        ReportState::Ready(body) => {
            let payload = json!({
                "status": "ready",
                "report": body.report,
                "insights": body.insights,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        ReportState::Degraded { report, error } => {
            let payload = json!({
                "status": "ready",
                "report": report.report,
                "insights": report.insights,
                "refresh_error": error,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        ReportState::Pending => {
            let payload = json!({ "status": "pending" });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        ReportState::Unavailable { error } => {
            let payload = json!({
                "status": "unavailable",
                "error": error,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn specialties_handler<S>(
    State(service): State<Arc<CompensationReportService<S>>>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match service.specialties() {
        Ok(specialties) => (StatusCode::OK, axum::Json(specialties)).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub(crate) async fn subspecialties_handler<S>(
    State(service): State<Arc<CompensationReportService<S>>>,
    Path(specialty_id): Path<String>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match service.subspecialties(&specialty_id) {
        Ok(subspecialties) => (StatusCode::OK, axum::Json(subspecialties)).into_response(),
        Err(error) => store_error_response(error),
    }
}

pub(crate) async fn positions_handler<S>(
    State(service): State<Arc<CompensationReportService<S>>>,
    Path(category_id): Path<String>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match service.positions(&category_id) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => store_error_response(error),
    }
}

fn store_error_response(error: StoreError) -> Response {
    let status = match error {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Conflict => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
