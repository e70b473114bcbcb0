use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentId, DemographicGroup, DimensionId, SubmissionId};
use super::normative::NormativeStore;
use super::repository::{RepositoryError, ResultRepository};
use super::service::{AssessmentService, AssessmentServiceError, SubmissionRequest};
use crate::narrative::{prompt, ResilientNarrator};

/// Shared state for the assessment endpoints.
pub struct AssessmentRouterState<R, S> {
    pub service: Arc<AssessmentService<R, S>>,
    pub narrator: Arc<ResilientNarrator>,
    /// Attach the canned narrative to narration requests.
    pub static_fallback: bool,
}

impl<R, S> Clone for AssessmentRouterState<R, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            narrator: Arc::clone(&self.narrator),
            static_fallback: self.static_fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    assessment: AssessmentId,
    dimension: DimensionId,
    score: f64,
    #[serde(default)]
    demographics: DemographicGroup,
}

/// Router builder exposing scoring, retrieval, narration and norm endpoints.
pub fn assessment_router<R, S>(state: AssessmentRouterState<R, S>) -> Router
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    Router::new()
        .route("/api/v1/assessments", get(list_handler::<R, S>))
        .route(
            "/api/v1/assessments/:assessment_id/questions",
            get(questions_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submissions",
            post(submit_handler::<R, S>),
        )
        .route(
            "/api/v1/submissions/:submission_id",
            get(submission_handler::<R, S>),
        )
        .route(
            "/api/v1/submissions/:submission_id/narrative",
            post(narrative_handler::<R, S>),
        )
        .route("/api/v1/norms/compare", post(compare_handler::<R, S>))
        .with_state(state)
}

pub(crate) async fn list_handler<R, S>(State(state): State<AssessmentRouterState<R, S>>) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    let assessments = state.service.registry().list();
    (StatusCode::OK, Json(json!({ "assessments": assessments }))).into_response()
}

pub(crate) async fn questions_handler<R, S>(
    State(state): State<AssessmentRouterState<R, S>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    let id = AssessmentId(assessment_id);
    match state.service.registry().questions(&id) {
        Some(questions) => (
            StatusCode::OK,
            Json(json!({ "assessment": id, "questions": questions })),
        )
            .into_response(),
        None => error_response(AssessmentServiceError::UnknownAssessment(id)),
    }
}

pub(crate) async fn submit_handler<R, S>(
    State(state): State<AssessmentRouterState<R, S>>,
    Path(assessment_id): Path<String>,
    Json(request): Json<SubmissionRequest>,
) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    match state.service.submit(&AssessmentId(assessment_id), request) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submission_handler<R, S>(
    State(state): State<AssessmentRouterState<R, S>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    match state.service.get(&SubmissionId(submission_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn narrative_handler<R, S>(
    State(state): State<AssessmentRouterState<R, S>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    let record = match state.service.get(&SubmissionId(submission_id)) {
        Ok(record) => record,
        Err(err) => return error_response(err),
    };
    let definition = match state.service.definition(&record.result.assessment) {
        Ok(definition) => definition,
        Err(err) => return error_response(err),
    };

    let request = prompt::report_request(&definition, &record.result, state.static_fallback);
    let key = prompt::cache_key(&record.result);
    let outcome = state.narrator.generate(&key, &request).await;

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(outcome)).into_response()
}

pub(crate) async fn compare_handler<R, S>(
    State(state): State<AssessmentRouterState<R, S>>,
    Json(request): Json<CompareRequest>,
) -> Response
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    let comparison = state.service.compare(
        &request.assessment,
        &request.dimension,
        request.score,
        &request.demographics,
    );
    (StatusCode::OK, Json(comparison)).into_response()
}

fn error_response(err: AssessmentServiceError) -> Response {
    let status = match &err {
        AssessmentServiceError::UnknownAssessment(_)
        | AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
