use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::SubmissionDraft;
use super::machine::FormRejection;
use super::sessions::{DraftId, SessionError, SubmissionSessions};
use crate::workflows::store::CompensationStore;

/// Router builder exposing the submission form session endpoints.
pub fn submission_router<S>(sessions: Arc<SubmissionSessions<S>>) -> Router
where
    S: CompensationStore + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(open_handler::<S>))
        .route(
            "/api/v1/submissions/:draft_id",
            get(view_handler::<S>).delete(abandon_handler::<S>),
        )
        .route(
            "/api/v1/submissions/:draft_id/draft",
            put(update_handler::<S>),
        )
        .route(
            "/api/v1/submissions/:draft_id/submit",
            post(submit_handler::<S>),
        )
        .with_state(sessions)
}

pub(crate) async fn open_handler<S>(State(sessions): State<Arc<SubmissionSessions<S>>>) -> Response
where
    S: CompensationStore + 'static,
{
    let view = sessions.open();
    (StatusCode::CREATED, axum::Json(view)).into_response()
}

pub(crate) async fn view_handler<S>(
    State(sessions): State<Arc<SubmissionSessions<S>>>,
    Path(draft_id): Path<String>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match sessions.view(&DraftId(draft_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(sessions): State<Arc<SubmissionSessions<S>>>,
    Path(draft_id): Path<String>,
    axum::Json(draft): axum::Json<SubmissionDraft>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match sessions.update_draft(&DraftId(draft_id), draft) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn submit_handler<S>(
    State(sessions): State<Arc<SubmissionSessions<S>>>,
    Path(draft_id): Path<String>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match sessions.submit(&DraftId(draft_id)) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn abandon_handler<S>(
    State(sessions): State<Arc<SubmissionSessions<S>>>,
    Path(draft_id): Path<String>,
) -> Response
where
    S: CompensationStore + 'static,
{
    match sessions.abandon(&DraftId(draft_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => session_error_response(error),
    }
}

fn session_error_response(error: SessionError) -> Response {
    match error {
        SessionError::NotFound(draft_id) => {
            let payload = json!({
                "error": "draft not found",
                "draft_id": draft_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        SessionError::Rejected(FormRejection::Invalid(errors)) => {
            let payload = json!({
                "error": "validation failed",
                "errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SessionError::Rejected(FormRejection::Incomplete) => {
            let payload = json!({
                "error": FormRejection::Incomplete.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SessionError::Rejected(rejection) => {
            let payload = json!({
                "error": rejection.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        SessionError::Persist(error) => {
            let payload = json!({
                "error": error.to_string(),
                "retryable": true,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
