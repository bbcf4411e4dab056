use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::questions::{validate_authored, DraftQuestion, QuestionGenerator};
use crate::cache::{job_detail_key, job_list_key, ResponseCache, JOBS_PREFIX};
use crate::errors::AppError;
use crate::matching::rank_jobs;
use crate::models::assessment::{GeneratedBy, Question};
use crate::models::job::{Job, JobStatus, RecruiterTest};
use crate::models::profile::clean_skills;
use crate::store::Store;

pub const DEFAULT_COMPANY_PASS_SCORE: i32 = 60;
const MIN_DESCRIPTION_CHARS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Views and requests
// ────────────────────────────────────────────────────────────────────────────

/// Candidate-facing job. The recruiter test is reduced to its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJobView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_level: String,
    pub location: String,
    pub salary_range: String,
    pub deadline_at: DateTime<Utc>,
    pub status: JobStatus,
    pub company_test_questions: usize,
    pub created_at: DateTime<Utc>,
}

impl PublicJobView {
    fn of(job: &Job, now: DateTime<Utc>) -> Self {
        PublicJobView {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            required_skills: job.required_skills.clone(),
            experience_level: job.experience_level.clone(),
            location: job.location.clone(),
            salary_range: job.salary_range.clone(),
            deadline_at: job.deadline_at,
            status: job.effective_status(now),
            company_test_questions: job
                .recruiter_test
                .as_ref()
                .map_or(0, |test| test.questions.len()),
            created_at: job.created_at,
        }
    }

    /// Cached views may outlive the deadline they were rendered against.
    fn refreshed(mut self, now: DateTime<Utc>) -> Self {
        if self.deadline_at <= now {
            self.status = JobStatus::Expired;
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct RecruiterJobView {
    #[serde(flatten)]
    pub job: PublicJobView,
    pub recruiter_test: Option<RecruiterTest>,
}

impl RecruiterJobView {
    fn of(job: &Job, now: DateTime<Utc>) -> Self {
        RecruiterJobView {
            job: PublicJobView::of(job, now),
            recruiter_test: job.recruiter_test.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuitableJob {
    #[serde(flatten)]
    pub job: PublicJobView,
    pub match_score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecruiterTestInput {
    #[serde(default)]
    pub questions: Vec<DraftQuestion>,
    pub pass_score: Option<i32>,
    pub generated_by: Option<GeneratedBy>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: String,
    pub deadline_at: DateTime<Utc>,
    pub recruiter_test: Option<RecruiterTestInput>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTestRequest {
    pub title: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

/// Editable draft for the recruiter; carries the answer key.
#[derive(Debug, Serialize)]
pub struct GeneratedTestDraft {
    pub questions: Vec<Question>,
    pub pass_score: i32,
    pub generated_by: GeneratedBy,
}

/// Validates a recruiter-authored test. Any invalid question rejects the set.
pub fn build_recruiter_test(input: &RecruiterTestInput) -> Result<RecruiterTest, AppError> {
    let questions = validate_authored(&input.questions).map_err(AppError::Validation)?;
    let pass_score = input.pass_score.unwrap_or(DEFAULT_COMPANY_PASS_SCORE);
    if !(0..=100).contains(&pass_score) {
        return Err(AppError::Validation(
            "pass_score must be between 0 and 100".to_string(),
        ));
    }
    Ok(RecruiterTest {
        questions,
        pass_score,
        generated_by: input.generated_by.unwrap_or(GeneratedBy::Manual),
    })
}

/// Loads a job for one of its recruiter's mutations.
pub async fn load_owned_job(
    store: &dyn Store,
    recruiter_id: Uuid,
    job_id: Uuid,
) -> Result<Job, AppError> {
    let job = store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    if !job.is_owned_by(recruiter_id) {
        return Err(AppError::Unauthorized(
            "Only the recruiter who posted this job can do that".to_string(),
        ));
    }
    Ok(job)
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct JobBoard {
    store: Arc<dyn Store>,
    cache: Arc<dyn ResponseCache>,
    questions: Arc<QuestionGenerator>,
    ttl: Duration,
}

impl JobBoard {
    pub fn new(
        store: Arc<dyn Store>,
        cache: Arc<dyn ResponseCache>,
        questions: Arc<QuestionGenerator>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            questions,
            ttl,
        }
    }

    pub async fn create_job(
        &self,
        recruiter_id: Uuid,
        req: CreateJobRequest,
    ) -> Result<RecruiterJobView, AppError> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        let description = req.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }
        let required_skills = clean_skills(&req.required_skills);
        if required_skills.is_empty() {
            return Err(AppError::Validation(
                "required_skills must list at least one skill".to_string(),
            ));
        }
        let now = Utc::now();
        if req.deadline_at <= now {
            return Err(AppError::Validation(
                "deadline_at must be in the future".to_string(),
            ));
        }
        let recruiter_test = req
            .recruiter_test
            .as_ref()
            .map(build_recruiter_test)
            .transpose()?;

        let job = Job {
            id: Uuid::new_v4(),
            recruiter_id,
            title: title.to_string(),
            description: description.to_string(),
            required_skills,
            experience_level: req.experience_level.trim().to_string(),
            location: req.location.trim().to_string(),
            salary_range: req.salary_range.trim().to_string(),
            deadline_at: req.deadline_at,
            status: JobStatus::Active,
            recruiter_test,
            created_at: now,
        };
        self.store.insert_job(&job).await?;
        self.cache.invalidate(JOBS_PREFIX).await;
        info!("Job {} '{}' posted", job.id, job.title);

        Ok(RecruiterJobView::of(&job, now))
    }

    /// GET /jobs, newest first.
    pub async fn list_public(&self) -> Result<Vec<PublicJobView>, AppError> {
        let key = job_list_key();
        let now = Utc::now();
        if let Some(views) = self.cached::<Vec<PublicJobView>>(&key).await {
            return Ok(views.into_iter().map(|v| v.refreshed(now)).collect());
        }

        let views: Vec<PublicJobView> = self
            .store
            .list_jobs()
            .await?
            .iter()
            .map(|job| PublicJobView::of(job, now))
            .collect();
        self.remember(&key, &views).await;
        Ok(views)
    }

    pub async fn get_public(&self, job_id: Uuid) -> Result<PublicJobView, AppError> {
        let key = job_detail_key(job_id);
        let now = Utc::now();
        if let Some(view) = self.cached::<PublicJobView>(&key).await {
            return Ok(view.refreshed(now));
        }

        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        let view = PublicJobView::of(&job, now);
        self.remember(&key, &view).await;
        Ok(view)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable cache entry '{key}': {e}");
                None
            }
        }
    }

    async fn remember<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.cache.set(key, raw, self.ttl).await,
            Err(e) => warn!("Could not serialize cache entry '{key}': {e}"),
        }
    }

    pub async fn list_mine(&self, recruiter_id: Uuid) -> Result<Vec<RecruiterJobView>, AppError> {
        let now = Utc::now();
        Ok(self
            .store
            .list_jobs_for_recruiter(recruiter_id)
            .await?
            .iter()
            .map(|job| RecruiterJobView::of(job, now))
            .collect())
    }

    pub async fn set_recruiter_test(
        &self,
        recruiter_id: Uuid,
        job_id: Uuid,
        input: RecruiterTestInput,
    ) -> Result<RecruiterJobView, AppError> {
        let mut job = load_owned_job(self.store.as_ref(), recruiter_id, job_id).await?;
        let test = build_recruiter_test(&input)?;
        if !self.store.set_recruiter_test(job_id, &test).await? {
            return Err(AppError::NotFound(format!("Job {job_id} not found")));
        }
        self.cache.invalidate(JOBS_PREFIX).await;
        info!(
            "Recruiter test for job {job_id} replaced ({} questions)",
            test.questions.len()
        );

        job.recruiter_test = Some(test);
        Ok(RecruiterJobView::of(&job, Utc::now()))
    }

    /// Explicit expiry. Candidates see it as soon as the cache is dropped.
    pub async fn expire(
        &self,
        recruiter_id: Uuid,
        job_id: Uuid,
    ) -> Result<RecruiterJobView, AppError> {
        let mut job = load_owned_job(self.store.as_ref(), recruiter_id, job_id).await?;
        if !self.store.mark_job_expired(job_id).await? {
            return Err(AppError::NotFound(format!("Job {job_id} not found")));
        }
        self.cache.invalidate(JOBS_PREFIX).await;
        info!("Job {job_id} expired by its recruiter");

        job.status = JobStatus::Expired;
        Ok(RecruiterJobView::of(&job, Utc::now()))
    }

    /// Drafts a recruiter test. Remote output is tagged `ai`, local output
    /// `manual`, since the recruiter is expected to edit it.
    pub async fn generate_recruiter_test(
        &self,
        req: &GenerateTestRequest,
    ) -> Result<GeneratedTestDraft, AppError> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        let skills = clean_skills(&req.required_skills);
        let (questions, generated_by) = self
            .questions
            .generate(title, &skills, GeneratedBy::Manual)
            .await;
        Ok(GeneratedTestDraft {
            questions,
            pass_score: DEFAULT_COMPANY_PASS_SCORE,
            generated_by,
        })
    }

    /// Open jobs the candidate has not applied to, best match first.
    pub async fn suitable_jobs(&self, candidate_id: Uuid) -> Result<Vec<SuitableJob>, AppError> {
        let skills = self
            .store
            .get_candidate(candidate_id)
            .await?
            .map(|record| record.profile.public.skills)
            .unwrap_or_default();
        let applied: HashSet<Uuid> = self
            .store
            .list_applications_for_candidate(candidate_id)
            .await?
            .into_iter()
            .map(|app| app.job_id)
            .collect();

        let now = Utc::now();
        let open: Vec<Job> = self
            .store
            .list_jobs()
            .await?
            .into_iter()
            .filter(|job| !job.is_expired(now) && !applied.contains(&job.id))
            .collect();

        Ok(rank_jobs(open, &skills)
            .into_iter()
            .map(|(job, fit)| SuitableJob {
                job: PublicJobView::of(&job, now),
                match_score: fit.score,
                matched_skills: fit.matched,
                missing_skills: fit.missing,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    use crate::cache::InMemoryCache;
    use crate::pipeline::{ApplicationPipeline, PipelineVariant};
    use crate::store::MemoryStore;
    use crate::test_support::{job, seed_job, seed_profile};

    fn board() -> (Arc<MemoryStore>, JobBoard) {
        let store = Arc::new(MemoryStore::new());
        let board = JobBoard::new(
            store.clone(),
            Arc::new(InMemoryCache::new()),
            Arc::new(QuestionGenerator::local_only()),
            Duration::from_secs(30),
        );
        (store, board)
    }

    fn draft(question: &str, options: &[&str], correct: &str) -> DraftQuestion {
        DraftQuestion {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.to_string(),
        }
    }

    fn request() -> CreateJobRequest {
        CreateJobRequest {
            title: "  Platform Engineer ".to_string(),
            description: "Own the deployment platform".to_string(),
            required_skills: vec!["Rust".to_string(), " rust ".to_string(), "AWS".to_string()],
            experience_level: "senior".to_string(),
            location: "Remote".to_string(),
            salary_range: String::new(),
            deadline_at: Utc::now() + ChronoDuration::days(14),
            recruiter_test: Some(RecruiterTestInput {
                questions: vec![draft("Pick the systems language", &["Rust", "CSS"], "Rust")],
                pass_score: Some(80),
                generated_by: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_create_job_cleans_input() {
        let (_, board) = board();
        let view = board.create_job(Uuid::new_v4(), request()).await.unwrap();
        assert_eq!(view.job.title, "Platform Engineer");
        assert_eq!(view.job.required_skills, vec!["Rust", "AWS"]);
        let test = view.recruiter_test.unwrap();
        assert_eq!(test.pass_score, 80);
        assert_eq!(test.generated_by, GeneratedBy::Manual);
    }

    #[tokio::test]
    async fn test_create_job_validation() {
        let (_, board) = board();

        let mut short = request();
        short.description = "too short".to_string();
        assert!(matches!(
            board.create_job(Uuid::new_v4(), short).await,
            Err(AppError::Validation(_))
        ));

        let mut past = request();
        past.deadline_at = Utc::now() - ChronoDuration::hours(1);
        assert!(matches!(
            board.create_job(Uuid::new_v4(), past).await,
            Err(AppError::Validation(_))
        ));

        let mut no_skills = request();
        no_skills.required_skills = vec!["  ".to_string()];
        assert!(matches!(
            board.create_job(Uuid::new_v4(), no_skills).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_test = request();
        bad_test.recruiter_test = Some(RecruiterTestInput {
            questions: vec![draft("Pick one", &["A", "B"], "C")],
            pass_score: None,
            generated_by: None,
        });
        assert!(matches!(
            board.create_job(Uuid::new_v4(), bad_test).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_score = request();
        if let Some(test) = bad_score.recruiter_test.as_mut() {
            test.pass_score = Some(101);
        }
        assert!(matches!(
            board.create_job(Uuid::new_v4(), bad_score).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_public_view_hides_recruiter_test() {
        let (_, board) = board();
        let created = board.create_job(Uuid::new_v4(), request()).await.unwrap();

        let view = board.get_public(created.job.id).await.unwrap();
        assert_eq!(view.company_test_questions, 1);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("correct_answer"));
        assert!(!json.contains("recruiter_test"));
    }

    #[tokio::test]
    async fn test_job_mutations_invalidate_listing() {
        let (_, board) = board();
        let recruiter = Uuid::new_v4();
        assert!(board.list_public().await.unwrap().is_empty());

        let created = board.create_job(recruiter, request()).await.unwrap();
        let listed = board.list_public().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, JobStatus::Active);

        board.expire(recruiter, created.job.id).await.unwrap();
        assert_eq!(board.list_public().await.unwrap()[0].status, JobStatus::Expired);
        assert_eq!(
            board.get_public(created.job.id).await.unwrap().status,
            JobStatus::Expired
        );
    }

    #[tokio::test]
    async fn test_only_owner_can_change_job() {
        let (_, board) = board();
        let created = board.create_job(Uuid::new_v4(), request()).await.unwrap();

        let err = board.expire(Uuid::new_v4(), created.job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = board.expire(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replacing_recruiter_test() {
        let (_, board) = board();
        let recruiter = Uuid::new_v4();
        let created = board.create_job(recruiter, request()).await.unwrap();

        let input = RecruiterTestInput {
            questions: vec![
                draft("First", &["a", "b"], "a"),
                draft("Second", &["c", "d"], "d"),
            ],
            pass_score: None,
            generated_by: Some(GeneratedBy::Ai),
        };
        let view = board
            .set_recruiter_test(recruiter, created.job.id, input)
            .await
            .unwrap();
        let test = view.recruiter_test.unwrap();
        assert_eq!(test.questions.len(), 2);
        assert_eq!(test.pass_score, DEFAULT_COMPANY_PASS_SCORE);
        assert_eq!(board.get_public(created.job.id).await.unwrap().company_test_questions, 2);
    }

    #[tokio::test]
    async fn test_generated_draft_is_tagged_manual_locally() {
        let (_, board) = board();
        let draft = board
            .generate_recruiter_test(&GenerateTestRequest {
                title: "Data Engineer".to_string(),
                required_skills: vec!["sql".to_string()],
            })
            .await
            .unwrap();
        assert!(draft.questions.len() >= 3);
        assert_eq!(draft.generated_by, GeneratedBy::Manual);
    }

    #[tokio::test]
    async fn test_suitable_jobs_are_open_unapplied_and_ranked() {
        let (store, board) = board();
        let recruiter = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        seed_profile(store.as_ref(), candidate, &["react", "node"]).await;

        let strong = job(recruiter, &["react", "node"], true);
        let weak = job(recruiter, &["java", "react"], true);
        let applied = job(recruiter, &["react"], true);
        let mut closed = job(recruiter, &["react"], true);
        closed.deadline_at = Utc::now() - ChronoDuration::minutes(1);
        for j in [&strong, &weak, &applied, &closed] {
            seed_job(store.as_ref(), j).await;
        }
        ApplicationPipeline::new(store.clone(), PipelineVariant::DualTest)
            .ensure_application(candidate, &applied)
            .await
            .unwrap();

        let suitable = board.suitable_jobs(candidate).await.unwrap();
        let ids: Vec<Uuid> = suitable.iter().map(|s| s.job.id).collect();
        assert_eq!(ids, vec![strong.id, weak.id]);
        assert_eq!(suitable[0].match_score, 100);
        assert_eq!(suitable[1].missing_skills, vec!["java"]);
    }
}
