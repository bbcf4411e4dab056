use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assessment::service::{RoundView, SubmissionResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::assessment::SubmittedAnswer;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// POST /api/v1/eligibility/:job_id/start
pub async fn handle_start_eligibility(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RoundView>, AppError> {
    let candidate_id = user.require_candidate()?;
    let view = state
        .qualification
        .start_eligibility(candidate_id, job_id)
        .await?;
    Ok(Json(view))
}

/// GET /api/v1/eligibility/:job_id
pub async fn handle_eligibility_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RoundView>, AppError> {
    let candidate_id = user.require_candidate()?;
    let view = state
        .qualification
        .eligibility_status(candidate_id, job_id)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/eligibility/:job_id/submit
pub async fn handle_submit_eligibility(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmissionResult>, AppError> {
    let candidate_id = user.require_candidate()?;
    let result = state
        .qualification
        .submit_eligibility(candidate_id, job_id, &req.answers)
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/company-test/:job_id
pub async fn handle_open_company_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RoundView>, AppError> {
    let candidate_id = user.require_candidate()?;
    let view = state
        .qualification
        .open_company_test(candidate_id, job_id)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/company-test/:job_id/submit
pub async fn handle_submit_company_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmissionResult>, AppError> {
    let candidate_id = user.require_candidate()?;
    let result = state
        .qualification
        .submit_company_test(candidate_id, job_id, &req.answers)
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/candidate/applications/:id/work-test
pub async fn handle_get_work_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<RoundView>, AppError> {
    let candidate_id = user.require_candidate()?;
    let view = state
        .qualification
        .work_test(candidate_id, application_id)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/candidate/applications/:id/work-test/submit
pub async fn handle_submit_work_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmissionResult>, AppError> {
    let candidate_id = user.require_candidate()?;
    let result = state
        .qualification
        .submit_work_test(candidate_id, application_id, &req.answers)
        .await?;
    Ok(Json(result))
}
