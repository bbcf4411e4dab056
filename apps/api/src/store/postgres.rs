use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::application::{
    Application, ApplicationStatus, DisplayProfile, InterviewInvite, PrivateProfile,
};
use crate::models::assessment::{QualificationRecord, RoundKind, RoundOutcome, RoundState};
use crate::models::job::{Job, JobStatus, RecruiterTest};
use crate::models::profile::{CandidateProfile, CandidateRecord};
use crate::store::{Store, StoreError};

/// Postgres-backed store. Uniqueness and compare-and-set guards live in the
/// SQL itself (see `migrations/0001_init.sql`).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    recruiter_id: Uuid,
    title: String,
    description: String,
    required_skills: Vec<String>,
    experience_level: String,
    location: String,
    salary_range: String,
    deadline_at: DateTime<Utc>,
    status: String,
    recruiter_test: Option<Json<RecruiterTest>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            recruiter_id: row.recruiter_id,
            title: row.title,
            description: row.description,
            required_skills: row.required_skills,
            experience_level: row.experience_level,
            location: row.location,
            salary_range: row.salary_range,
            deadline_at: row.deadline_at,
            status: row.status.parse::<JobStatus>().map_err(StoreError::Corrupt)?,
            recruiter_test: row.recruiter_test.map(|Json(test)| test),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: Uuid,
    public_id: Option<String>,
    profile: Json<CandidateProfile>,
    updated_at: DateTime<Utc>,
}

impl From<CandidateRow> for CandidateRecord {
    fn from(row: CandidateRow) -> Self {
        CandidateRecord {
            id: row.id,
            public_id: row.public_id,
            profile: row.profile.0,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct QualificationRow {
    id: Uuid,
    candidate_id: Uuid,
    job_id: Uuid,
    required_skills_snapshot: Vec<String>,
    eligibility: Json<RoundState>,
    company_round: Option<Json<RoundState>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QualificationRow> for QualificationRecord {
    fn from(row: QualificationRow) -> Self {
        QualificationRecord {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            required_skills_snapshot: row.required_skills_snapshot,
            eligibility: row.eligibility.0,
            company: row.company_round.map(|Json(round)| round),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    recruiter_id: Uuid,
    candidate_id: Uuid,
    anonymous_id: String,
    match_score: i32,
    matched_skills: Vec<String>,
    missing_skills: Vec<String>,
    status: String,
    display_profile: Json<DisplayProfile>,
    private_profile: Json<PrivateProfile>,
    invite_sent_at: Option<DateTime<Utc>>,
    invite_message: Option<String>,
    work_test: Option<Json<RoundState>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            recruiter_id: row.recruiter_id,
            candidate_id: row.candidate_id,
            anonymous_id: row.anonymous_id,
            match_score: row.match_score,
            matched_skills: row.matched_skills,
            missing_skills: row.missing_skills,
            status: row
                .status
                .parse::<ApplicationStatus>()
                .map_err(StoreError::Corrupt)?,
            display_profile: row.display_profile.0,
            private_profile: row.private_profile.0,
            interview_invite: row.invite_sent_at.map(|sent_at| InterviewInvite {
                sent_at,
                message: row.invite_message.unwrap_or_default(),
            }),
            work_test: row.work_test.map(|Json(round)| round),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn jobs_from_rows(rows: Vec<JobRow>) -> Result<Vec<Job>, StoreError> {
    rows.into_iter().map(Job::try_from).collect()
}

fn applications_from_rows(rows: Vec<ApplicationRow>) -> Result<Vec<Application>, StoreError> {
    rows.into_iter().map(Application::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, recruiter_id, title, description, required_skills, experience_level,
                 location, salary_range, deadline_at, status, recruiter_test, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(job.id)
        .bind(job.recruiter_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.required_skills)
        .bind(&job.experience_level)
        .bind(&job.location)
        .bind(&job.salary_range)
        .bind(job.deadline_at)
        .bind(job.status.as_str())
        .bind(job.recruiter_test.as_ref().map(Json))
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let rows: Vec<JobRow> = sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        jobs_from_rows(rows)
    }

    async fn list_jobs_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>, StoreError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT * FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        jobs_from_rows(rows)
    }

    async fn set_recruiter_test(
        &self,
        job_id: Uuid,
        test: &RecruiterTest,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE jobs SET recruiter_test = $2 WHERE id = $1")
            .bind(job_id)
            .bind(Json(test))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_job_expired(&self, job_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE jobs SET status = 'expired' WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRecord>, StoreError> {
        let row: Option<CandidateRow> = sqlx::query_as("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CandidateRecord::from))
    }

    async fn save_profile(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
    ) -> Result<CandidateRecord, StoreError> {
        let row: CandidateRow = sqlx::query_as(
            r#"
            INSERT INTO candidates (id, profile, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (id) DO UPDATE
                SET profile = EXCLUDED.profile, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(profile))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn assign_public_id(&self, id: Uuid, public_id: &str) -> Result<String, StoreError> {
        let result: Result<(Option<String>,), sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO candidates (id, public_id)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET public_id = COALESCE(candidates.public_id, EXCLUDED.public_id)
            RETURNING public_id
            "#,
        )
        .bind(id)
        .bind(public_id)
        .fetch_one(&self.pool)
        .await;

        let (stored,) = match result {
            Ok(row) => row,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(StoreError::Conflict(format!(
                    "public id {public_id} belongs to another candidate"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        stored.ok_or_else(|| StoreError::Corrupt(format!("candidate {id} has no public id")))
    }

    async fn get_qualification(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<QualificationRecord>, StoreError> {
        let row: Option<QualificationRow> = sqlx::query_as(
            "SELECT * FROM qualification_tests WHERE candidate_id = $1 AND job_id = $2",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(QualificationRecord::from))
    }

    async fn insert_qualification_if_absent(
        &self,
        record: &QualificationRecord,
    ) -> Result<QualificationRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO qualification_tests
                (id, candidate_id, job_id, required_skills_snapshot, eligibility,
                 company_round, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (candidate_id, job_id) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(record.candidate_id)
        .bind(record.job_id)
        .bind(&record.required_skills_snapshot)
        .bind(Json(&record.eligibility))
        .bind(record.company.as_ref().map(Json))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_qualification(record.candidate_id, record.job_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "qualification for candidate {} on job {} vanished after insert",
                    record.candidate_id, record.job_id
                ))
            })
    }

    async fn open_company_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError> {
        let row: Option<(Option<Json<RoundState>>,)> = sqlx::query_as(
            r#"
            UPDATE qualification_tests
            SET company_round = COALESCE(company_round, $3), updated_at = now()
            WHERE candidate_id = $1 AND job_id = $2
            RETURNING company_round
            "#,
        )
        .bind(candidate_id)
        .bind(job_id)
        .bind(Json(round))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(round,)| round.map(|Json(r)| r)))
    }

    async fn complete_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        kind: RoundKind,
        outcome: &RoundOutcome,
    ) -> Result<bool, StoreError> {
        // `RoundOutcome` serialises to exactly the keys it overwrites on the
        // round document, so a JSONB merge applies it in place.
        let sql = match kind {
            RoundKind::Eligibility => {
                r#"
                UPDATE qualification_tests
                SET eligibility = eligibility || $3, updated_at = now()
                WHERE candidate_id = $1 AND job_id = $2
                  AND eligibility->>'status' = 'pending'
                "#
            }
            RoundKind::Company => {
                r#"
                UPDATE qualification_tests
                SET company_round = company_round || $3, updated_at = now()
                WHERE candidate_id = $1 AND job_id = $2
                  AND company_round->>'status' = 'pending'
                "#
            }
        };
        let result = sqlx::query(sql)
            .bind(candidate_id)
            .bind(job_id)
            .bind(Json(outcome))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_application(&self, application: &Application) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO applications
                (id, job_id, recruiter_id, candidate_id, anonymous_id, match_score,
                 matched_skills, missing_skills, status, display_profile, private_profile,
                 invite_sent_at, invite_message, work_test, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.recruiter_id)
        .bind(application.candidate_id)
        .bind(&application.anonymous_id)
        .bind(application.match_score)
        .bind(&application.matched_skills)
        .bind(&application.missing_skills)
        .bind(application.status.as_str())
        .bind(Json(&application.display_profile))
        .bind(Json(&application.private_profile))
        .bind(application.interview_invite.as_ref().map(|i| i.sent_at))
        .bind(application.interview_invite.as_ref().map(|i| i.message.clone()))
        .bind(application.work_test.as_ref().map(Json))
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(format!(
                    "application for candidate {} on job {}",
                    application.candidate_id, application.job_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        let row: Option<ApplicationRow> =
            sqlx::query_as("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Application::try_from).transpose()
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE candidate_id = $1 AND job_id = $2",
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY match_score DESC, created_at ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        applications_from_rows(rows)
    }

    async fn list_applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        applications_from_rows(rows)
    }

    async fn record_interview_invite(
        &self,
        id: Uuid,
        invite: &InterviewInvite,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'shortlisted',
                invite_sent_at = COALESCE(invite_sent_at, $2),
                invite_message = CASE WHEN invite_sent_at IS NULL THEN $3 ELSE invite_message END,
                updated_at = now()
            WHERE id = $1 AND status <> 'rejected'
            "#,
        )
        .bind(id)
        .bind(invite.sent_at)
        .bind(&invite.message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn assign_work_test(
        &self,
        id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError> {
        let row: Option<(Option<Json<RoundState>>,)> = sqlx::query_as(
            r#"
            UPDATE applications
            SET work_test = COALESCE(work_test, $2), updated_at = now()
            WHERE id = $1
            RETURNING work_test
            "#,
        )
        .bind(id)
        .bind(Json(round))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(round,)| round.map(|Json(r)| r)))
    }

    async fn complete_work_test(
        &self,
        id: Uuid,
        outcome: &RoundOutcome,
        status: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET work_test = work_test || $2, status = $3, updated_at = now()
            WHERE id = $1 AND work_test->>'status' = 'pending'
            "#,
        )
        .bind(id)
        .bind(Json(outcome))
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn override_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE applications SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }
}
