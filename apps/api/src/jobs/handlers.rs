use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::service::{
    CreateJobRequest, GenerateTestRequest, GeneratedTestDraft, PublicJobView, RecruiterJobView,
    RecruiterTestInput, SuitableJob,
};
use crate::state::AppState;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<RecruiterJobView>), AppError> {
    let recruiter_id = user.require_recruiter()?;
    let view = state.jobs.create_job(recruiter_id, req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicJobView>>, AppError> {
    Ok(Json(state.jobs.list_public().await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<PublicJobView>, AppError> {
    Ok(Json(state.jobs.get_public(job_id).await?))
}

/// GET /api/v1/jobs/mine
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<RecruiterJobView>>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    Ok(Json(state.jobs.list_mine(recruiter_id).await?))
}

/// PUT /api/v1/recruiter/jobs/:job_id/test
pub async fn handle_set_recruiter_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<RecruiterTestInput>,
) -> Result<Json<RecruiterJobView>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let view = state
        .jobs
        .set_recruiter_test(recruiter_id, job_id, req)
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/recruiter/jobs/:job_id/expire
pub async fn handle_expire_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<RecruiterJobView>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    Ok(Json(state.jobs.expire(recruiter_id, job_id).await?))
}

/// POST /api/v1/recruiter/jobs/test/generate
pub async fn handle_generate_recruiter_test(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<GenerateTestRequest>,
) -> Result<Json<GeneratedTestDraft>, AppError> {
    user.require_recruiter()?;
    Ok(Json(state.jobs.generate_recruiter_test(&req).await?))
}

/// GET /api/v1/candidate/jobs/suitable
pub async fn handle_suitable_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<SuitableJob>>, AppError> {
    let candidate_id = user.require_candidate()?;
    Ok(Json(state.jobs.suitable_jobs(candidate_id).await?))
}
