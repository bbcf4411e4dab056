use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::score_skills;
use crate::models::application::{
    Application, ApplicationStatus, DisplayProfile, InterviewInvite, PrivateProfile,
};
use crate::models::assessment::RoundSummary;
use crate::models::job::Job;
use crate::models::profile::CandidateRecord;
use crate::pipeline::{AnonymousIds, PipelineVariant};
use crate::store::{Store, StoreError};

fn already_applied() -> AppError {
    AppError::Duplicate("You have already applied to this job".to_string())
}

/// What the candidate gets back after an application is created.
#[derive(Debug, Serialize)]
pub struct ApplicationReceipt {
    pub id: Uuid,
    pub job_id: Uuid,
    pub anonymous_id: String,
    pub match_score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Application> for ApplicationReceipt {
    fn from(app: &Application) -> Self {
        ApplicationReceipt {
            id: app.id,
            job_id: app.job_id,
            anonymous_id: app.anonymous_id.clone(),
            match_score: app.match_score,
            matched_skills: app.matched_skills.clone(),
            missing_skills: app.missing_skills.clone(),
            status: app.status,
            created_at: app.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CandidateApplicationView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub anonymous_id: String,
    pub status: ApplicationStatus,
    pub match_score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub interview_invite: Option<InterviewInvite>,
    pub work_test: Option<RoundSummary>,
    pub created_at: DateTime<Utc>,
}

/// Owns the `Application` lifecycle on the candidate side: the ordered gate
/// checks before apply and the one place an application row is created.
pub struct ApplicationPipeline {
    store: Arc<dyn Store>,
    variant: PipelineVariant,
    ids: AnonymousIds,
}

impl ApplicationPipeline {
    pub fn new(store: Arc<dyn Store>, variant: PipelineVariant) -> Self {
        Self {
            store,
            variant,
            ids: AnonymousIds::default(),
        }
    }

    pub fn with_anonymous_ids(mut self, ids: AnonymousIds) -> Self {
        self.ids = ids;
        self
    }

    /// Loads a job that still accepts candidate actions. Expiry is evaluated
    /// here, on every attempt, rather than by a background sweep.
    pub async fn open_job(&self, job_id: Uuid) -> Result<Job, AppError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        if job.is_expired(Utc::now()) {
            return Err(AppError::Expired(format!(
                "Job '{}' is closed to new candidates",
                job.title
            )));
        }
        Ok(job)
    }

    /// POST /jobs/:id/apply. Gate order: job exists, job open, not applied
    /// yet, eligibility passed, company round passed (dual-test only).
    pub async fn apply(&self, candidate_id: Uuid, job_id: Uuid) -> Result<Application, AppError> {
        let job = self.open_job(job_id).await?;

        if self
            .store
            .find_application(candidate_id, job_id)
            .await?
            .is_some()
        {
            return Err(already_applied());
        }

        let record = self.store.get_qualification(candidate_id, job_id).await?;
        if !record.as_ref().is_some_and(|r| r.eligibility_passed()) {
            return Err(AppError::GateNotSatisfied(
                "Pass the eligibility test for this job before applying".to_string(),
            ));
        }
        if self.variant.requires_company_round()
            && !record.as_ref().is_some_and(|r| r.company_passed())
        {
            return Err(AppError::GateNotSatisfied(
                "Pass the company test for this job before applying".to_string(),
            ));
        }

        self.create_application_record(candidate_id, &job).await
    }

    /// Scores the candidate, snapshots both profile halves and inserts the
    /// row. The storage unique key decides concurrent races; the loser gets
    /// `Duplicate`.
    pub async fn create_application_record(
        &self,
        candidate_id: Uuid,
        job: &Job,
    ) -> Result<Application, AppError> {
        let candidate = self
            .store
            .get_candidate(candidate_id)
            .await?
            .unwrap_or_else(|| CandidateRecord::empty(candidate_id));
        let profile = &candidate.profile;
        let fit = score_skills(&job.required_skills, &profile.public.skills);

        let anonymous_id = match candidate.public_id {
            Some(id) => id,
            None => {
                self.store
                    .assign_public_id(candidate_id, &self.ids.id_for(candidate_id))
                    .await?
            }
        };

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: job.id,
            recruiter_id: job.recruiter_id,
            candidate_id,
            anonymous_id,
            match_score: fit.score,
            matched_skills: fit.matched,
            missing_skills: fit.missing,
            status: ApplicationStatus::Applied,
            display_profile: DisplayProfile::from(&profile.public),
            private_profile: PrivateProfile::from(&profile.personal),
            interview_invite: None,
            work_test: None,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_application(&application).await {
            Ok(()) => {
                info!(
                    "Application {} created for job {} (match {})",
                    application.id, job.id, application.match_score
                );
                Ok(application)
            }
            Err(StoreError::Conflict(_)) => Err(already_applied()),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the candidate's application for `job`, creating it if needed.
    /// Used when a passed company round admits the candidate.
    pub async fn ensure_application(
        &self,
        candidate_id: Uuid,
        job: &Job,
    ) -> Result<Application, AppError> {
        if let Some(existing) = self.store.find_application(candidate_id, job.id).await? {
            return Ok(existing);
        }
        match self.create_application_record(candidate_id, job).await {
            Err(AppError::Duplicate(_)) => self
                .store
                .find_application(candidate_id, job.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Application not found".to_string())),
            other => other,
        }
    }

    /// GET /candidate/applications, newest first.
    pub async fn applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<CandidateApplicationView>, AppError> {
        let applications = self
            .store
            .list_applications_for_candidate(candidate_id)
            .await?;

        let mut titles: HashMap<Uuid, String> = HashMap::new();
        let mut views = Vec::with_capacity(applications.len());
        for app in applications {
            if !titles.contains_key(&app.job_id) {
                let title = self
                    .store
                    .get_job(app.job_id)
                    .await?
                    .map(|job| job.title)
                    .unwrap_or_default();
                titles.insert(app.job_id, title);
            }
            views.push(CandidateApplicationView {
                id: app.id,
                job_id: app.job_id,
                job_title: titles.get(&app.job_id).cloned().unwrap_or_default(),
                anonymous_id: app.anonymous_id,
                status: app.status,
                match_score: app.match_score,
                matched_skills: app.matched_skills,
                missing_skills: app.missing_skills,
                interview_invite: app.interview_invite,
                work_test: app.work_test.as_ref().map(RoundSummary::from),
                created_at: app.created_at,
            });
        }
        Ok(views)
    }
}
