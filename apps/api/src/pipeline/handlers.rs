use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::pipeline::service::{ApplicationReceipt, CandidateApplicationView};
use crate::state::AppState;

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApplicationReceipt>), AppError> {
    let candidate_id = user.require_candidate()?;
    let application = state.pipeline.apply(candidate_id, job_id).await?;
    Ok((StatusCode::CREATED, Json(ApplicationReceipt::from(&application))))
}

/// GET /api/v1/candidate/applications
pub async fn handle_candidate_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CandidateApplicationView>>, AppError> {
    let candidate_id = user.require_candidate()?;
    let views = state.pipeline.applications_for_candidate(candidate_id).await?;
    Ok(Json(views))
}
