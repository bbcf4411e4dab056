use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::profile::service::{ProfileView, ResumeUploadResult, UpdateProfileRequest};
use crate::state::AppState;

/// Largest resume accepted by the upload route.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// GET /api/v1/candidate/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileView>, AppError> {
    let candidate_id = user.require_candidate()?;
    Ok(Json(state.profiles.get(candidate_id).await?))
}

/// PUT /api/v1/candidate/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let candidate_id = user.require_candidate()?;
    Ok(Json(state.profiles.update(candidate_id, req).await?))
}

/// POST /api/v1/candidate/profile/auto-fill
pub async fn handle_auto_fill_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ResumeUploadResult>, AppError> {
    let candidate_id = user.require_candidate()?;
    Ok(Json(state.profiles.auto_fill(candidate_id).await?))
}

/// POST /api/v1/candidate/profile/resume
/// Multipart body with the file in the `resume` field.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResult>, AppError> {
    let candidate_id = user.require_candidate()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read resume upload: {e}")))?;

        let result = state
            .profiles
            .upload_resume(
                candidate_id,
                &data,
                file_name.as_deref(),
                content_type.as_deref(),
            )
            .await?;
        return Ok(Json(result));
    }

    Err(AppError::Validation(
        "Resume file is required in the 'resume' field".to_string(),
    ))
}
