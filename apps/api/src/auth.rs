use std::str::FromStr;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// Header carrying the authenticated user's id, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    Recruiter,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "recruiter" => Ok(Role::Recruiter),
            _ => Err(()),
        }
    }
}

/// Caller identity forwarded by the gateway. Credential checks happen
/// upstream; this extractor only refuses requests that carry no identity.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn require_candidate(&self) -> Result<Uuid, AppError> {
        match self.role {
            Role::Candidate => Ok(self.id),
            Role::Recruiter => Err(AppError::Unauthorized(
                "This action is only available to candidates".to_string(),
            )),
        }
    }

    pub fn require_recruiter(&self) -> Result<Uuid, AppError> {
        match self.role {
            Role::Recruiter => Ok(self.id),
            Role::Candidate => Err(AppError::Unauthorized(
                "This action is only available to recruiters".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };

        let id = header(USER_ID_HEADER)
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or(AppError::Unauthenticated)?;
        let role = header(USER_ROLE_HEADER)
            .and_then(|raw| raw.parse::<Role>().ok())
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser { id, role })
    }
}
