use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::assessment::questions::{normalize_question_ids, QuestionGenerator};
use crate::errors::AppError;
use crate::jobs::service::load_owned_job;
use crate::models::application::{
    Application, ApplicationStatus, DisplayProfile, InterviewInvite, PrivateProfile,
};
use crate::models::assessment::{GeneratedBy, RoundState, RoundSummary};
use crate::pipeline::PipelineVariant;
use crate::store::Store;

const DEFAULT_INVITE_MESSAGE: &str =
    "You have been shortlisted. The recruiter will contact you to schedule an interview.";

/// Recruiter projection of an application. Identity stays behind
/// [`RecruiterReview::reveal`].
#[derive(Debug, Serialize)]
pub struct RecruiterApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub anonymous_id: String,
    pub status: ApplicationStatus,
    pub match_score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub display_profile: DisplayProfile,
    pub interview_invite: Option<InterviewInvite>,
    pub work_test: Option<RoundSummary>,
    pub created_at: DateTime<Utc>,
}

impl From<Application> for RecruiterApplicationView {
    fn from(app: Application) -> Self {
        RecruiterApplicationView {
            id: app.id,
            job_id: app.job_id,
            anonymous_id: app.anonymous_id,
            status: app.status,
            match_score: app.match_score,
            matched_skills: app.matched_skills,
            missing_skills: app.missing_skills,
            display_profile: app.display_profile,
            interview_invite: app.interview_invite,
            work_test: app.work_test.as_ref().map(RoundSummary::from),
            created_at: app.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdentityReveal {
    pub application_id: Uuid,
    pub anonymous_id: String,
    pub private_profile: PrivateProfile,
}

#[derive(Debug, Serialize)]
pub struct WorkTestAssignment {
    pub application_id: Uuid,
    pub work_test: RoundSummary,
}

pub struct RecruiterReview {
    store: Arc<dyn Store>,
    questions: Arc<QuestionGenerator>,
    variant: PipelineVariant,
    pass_score: i32,
}

impl RecruiterReview {
    pub fn new(
        store: Arc<dyn Store>,
        questions: Arc<QuestionGenerator>,
        variant: PipelineVariant,
        pass_score: i32,
    ) -> Self {
        Self {
            store,
            questions,
            variant,
            pass_score,
        }
    }

    async fn owned_application(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
    ) -> Result<Application, AppError> {
        let application = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Application {application_id} not found"))
            })?;
        if application.recruiter_id != recruiter_id {
            return Err(AppError::Unauthorized(
                "Only the recruiter who posted this job can review its applications".to_string(),
            ));
        }
        Ok(application)
    }

    async fn reload(&self, application_id: Uuid) -> Result<Application, AppError> {
        self.store
            .get_application(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
    }

    /// Applications for one job, best match first.
    pub async fn list_applications(
        &self,
        recruiter_id: Uuid,
        job_id: Uuid,
    ) -> Result<Vec<RecruiterApplicationView>, AppError> {
        load_owned_job(self.store.as_ref(), recruiter_id, job_id).await?;
        Ok(self
            .store
            .list_applications_for_job(job_id)
            .await?
            .into_iter()
            .map(RecruiterApplicationView::from)
            .collect())
    }

    /// Moves the application to `shortlisted` and sends the interview invite.
    /// An existing invite is kept as sent.
    pub async fn shortlist(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
        message: Option<String>,
    ) -> Result<RecruiterApplicationView, AppError> {
        let application = self.owned_application(recruiter_id, application_id).await?;
        if application.status == ApplicationStatus::Rejected {
            return Err(rejected());
        }
        if application.status == ApplicationStatus::Shortlisted && application.invite_sent() {
            return Ok(application.into());
        }

        let invite = InterviewInvite {
            sent_at: Utc::now(),
            message: message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_INVITE_MESSAGE.to_string()),
        };
        let recorded = self
            .store
            .record_interview_invite(application_id, &invite)
            .await?;

        if !recorded {
            return Err(rejected());
        }

        let current = self.reload(application_id).await?;
        info!(
            "Application {application_id} ({}) shortlisted with interview invite",
            current.anonymous_id
        );
        Ok(current.into())
    }

    /// The only path that returns identity fields. Requires the application
    /// to be shortlisted and its interview invite sent.
    pub async fn reveal(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
    ) -> Result<IdentityReveal, AppError> {
        let application = self.owned_application(recruiter_id, application_id).await?;
        if application.status != ApplicationStatus::Shortlisted || !application.invite_sent() {
            return Err(AppError::GateNotSatisfied(
                "Shortlist the candidate and send an interview invite before revealing identity"
                    .to_string(),
            ));
        }
        info!(
            "Identity revealed for application {application_id} ({})",
            application.anonymous_id
        );
        Ok(IdentityReveal {
            application_id,
            anonymous_id: application.anonymous_id,
            private_profile: application.private_profile,
        })
    }

    /// Manual status changes exist only in the single-gate pipeline.
    pub async fn override_status(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<RecruiterApplicationView, AppError> {
        if !self.variant.allows_manual_status() {
            return Err(AppError::Unauthorized(
                "Application status follows test outcomes and shortlisting in this pipeline"
                    .to_string(),
            ));
        }
        self.owned_application(recruiter_id, application_id).await?;
        if !self.store.override_status(application_id, status).await? {
            return Err(AppError::NotFound(format!(
                "Application {application_id} not found"
            )));
        }
        info!(
            "Application {application_id} status set to {} by recruiter",
            status.as_str()
        );
        Ok(self.reload(application_id).await?.into())
    }

    /// Assigns a work test to an application still under review. Assigning
    /// again returns the test already stored.
    pub async fn assign_work_test(
        &self,
        recruiter_id: Uuid,
        application_id: Uuid,
        pass_score: Option<i32>,
    ) -> Result<WorkTestAssignment, AppError> {
        let application = self.owned_application(recruiter_id, application_id).await?;
        if let Some(existing) = &application.work_test {
            return Ok(WorkTestAssignment {
                application_id,
                work_test: existing.into(),
            });
        }
        if application.status != ApplicationStatus::Applied {
            return Err(AppError::GateNotSatisfied(
                "Work tests can only be assigned to applications still under review".to_string(),
            ));
        }
        let pass_score = pass_score.unwrap_or(self.pass_score);
        if !(0..=100).contains(&pass_score) {
            return Err(AppError::Validation(
                "pass_score must be between 0 and 100".to_string(),
            ));
        }

        let job = load_owned_job(self.store.as_ref(), recruiter_id, application.job_id).await?;
        let (questions, generated_by) = self
            .questions
            .generate(&job.title, &job.required_skills, GeneratedBy::Fallback)
            .await;
        let round = RoundState::pending(
            normalize_question_ids(&questions, "wq"),
            pass_score,
            generated_by,
        );
        let stored = self
            .store
            .assign_work_test(application_id, &round)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Application {application_id} not found"))
            })?;
        info!(
            "Work test assigned to application {application_id} ({} questions)",
            stored.questions.len()
        );

        Ok(WorkTestAssignment {
            application_id,
            work_test: (&stored).into(),
        })
    }
}

fn rejected() -> AppError {
    AppError::GateNotSatisfied("Rejected applications cannot be shortlisted".to_string())
}
