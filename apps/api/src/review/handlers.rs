use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::review::service::{IdentityReveal, RecruiterApplicationView, WorkTestAssignment};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct ShortlistRequest {
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Deserialize, Default)]
pub struct AssignWorkTestRequest {
    pub pass_score: Option<i32>,
}

/// GET /api/v1/recruiter/jobs/:job_id/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<RecruiterApplicationView>>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let views = state.review.list_applications(recruiter_id, job_id).await?;
    Ok(Json(views))
}

/// PUT /api/v1/recruiter/applications/:id/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    body: Option<Json<ShortlistRequest>>,
) -> Result<Json<RecruiterApplicationView>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let Json(req) = body.unwrap_or_default();
    let view = state
        .review
        .shortlist(recruiter_id, application_id, req.message)
        .await?;
    Ok(Json(view))
}

/// GET /api/v1/recruiter/applications/:id/reveal
pub async fn handle_reveal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> Result<Json<IdentityReveal>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    Ok(Json(state.review.reveal(recruiter_id, application_id).await?))
}

/// PUT /api/v1/recruiter/applications/:id/status
pub async fn handle_override_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<RecruiterApplicationView>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let view = state
        .review
        .override_status(recruiter_id, application_id, req.status)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/recruiter/applications/:id/work-test
pub async fn handle_assign_work_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    body: Option<Json<AssignWorkTestRequest>>,
) -> Result<Json<WorkTestAssignment>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let Json(req) = body.unwrap_or_default();
    let assignment = state
        .review
        .assign_work_test(recruiter_id, application_id, req.pass_score)
        .await?;
    Ok(Json(assignment))
}
