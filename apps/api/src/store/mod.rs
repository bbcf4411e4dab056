//! Persistence boundary for jobs, candidates, qualification tests and
//! applications.
//!
//! Every state transition that the admission pipeline relies on for
//! correctness is a single atomic store operation: insert-if-absent for test
//! instances, unique insert for applications, and compare-and-set on
//! `pending` for submissions. Services never read-then-write to move a record
//! between states.
//!
//! `AppState` holds an `Arc<dyn Store>`: `PgStore` in deployments,
//! `MemoryStore` for development without a database and for tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus, InterviewInvite};
use crate::models::assessment::{QualificationRecord, RoundKind, RoundOutcome, RoundState};
use crate::models::job::{Job, RecruiterTest};
use crate::models::profile::{CandidateProfile, CandidateRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to its domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    // ── jobs ────────────────────────────────────────────────────────────────

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// All jobs, newest first.
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;

    async fn list_jobs_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>, StoreError>;

    /// Returns `false` when the job does not exist.
    async fn set_recruiter_test(&self, job_id: Uuid, test: &RecruiterTest)
        -> Result<bool, StoreError>;

    async fn mark_job_expired(&self, job_id: Uuid) -> Result<bool, StoreError>;

    // ── candidates ──────────────────────────────────────────────────────────

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRecord>, StoreError>;

    /// Upserts the whole profile document.
    async fn save_profile(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
    ) -> Result<CandidateRecord, StoreError>;

    /// Sets the anonymous id only if none is stored yet and returns whichever
    /// id the candidate ends up with.
    async fn assign_public_id(&self, id: Uuid, public_id: &str) -> Result<String, StoreError>;

    // ── qualification tests ─────────────────────────────────────────────────

    async fn get_qualification(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<QualificationRecord>, StoreError>;

    /// Inserts `record` unless one already exists for its (candidate, job)
    /// pair, then returns the stored record. Concurrent callers all observe
    /// the same winner.
    async fn insert_qualification_if_absent(
        &self,
        record: &QualificationRecord,
    ) -> Result<QualificationRecord, StoreError>;

    /// Stores `round` as the company round unless one is already open.
    /// Returns the stored round, or `None` when no qualification record exists.
    async fn open_company_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError>;

    /// Compare-and-set on `pending`. Returns `false` when the round was not
    /// pending (or does not exist), in which case nothing was written.
    async fn complete_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        kind: RoundKind,
        outcome: &RoundOutcome,
    ) -> Result<bool, StoreError>;

    // ── applications ────────────────────────────────────────────────────────

    /// Fails with [`StoreError::Conflict`] when the (job, candidate) pair
    /// already has an application.
    async fn insert_application(&self, application: &Application) -> Result<(), StoreError>;

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError>;

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, StoreError>;

    /// Highest match score first.
    async fn list_applications_for_job(&self, job_id: Uuid)
        -> Result<Vec<Application>, StoreError>;

    /// Newest first.
    async fn list_applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError>;

    /// Moves a non-rejected application to `shortlisted`, stamping `invite`
    /// unless one was already sent. Returns `false` if the application is
    /// rejected or missing.
    async fn record_interview_invite(
        &self,
        id: Uuid,
        invite: &InterviewInvite,
    ) -> Result<bool, StoreError>;

    /// Stores `round` as the work test unless one is already assigned.
    /// Returns the stored round, or `None` when the application is missing.
    async fn assign_work_test(
        &self,
        id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError>;

    /// Compare-and-set on a pending work test; also writes `status`.
    async fn complete_work_test(
        &self,
        id: Uuid,
        outcome: &RoundOutcome,
        status: ApplicationStatus,
    ) -> Result<bool, StoreError>;

    async fn override_status(&self, id: Uuid, status: ApplicationStatus)
        -> Result<bool, StoreError>;
}
