use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::assessment::grading::grade;
use crate::assessment::questions::{normalize_question_ids, QuestionGenerator};
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::assessment::{
    GeneratedBy, QualificationRecord, QuestionView, RoundKind, RoundState, SubmittedAnswer,
    TestStatus,
};
use crate::pipeline::ApplicationPipeline;
use crate::store::Store;

/// A round as shown to the candidate taking it. Questions are present only
/// while the round is pending, and never carry the answer key.
#[derive(Debug, Serialize)]
pub struct RoundView {
    pub job_id: Uuid,
    pub status: TestStatus,
    pub score: Option<i32>,
    pub pass_score: Option<i32>,
    pub generated_by: Option<GeneratedBy>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub questions: Option<Vec<QuestionView>>,
}

impl RoundView {
    fn of(job_id: Uuid, round: &RoundState) -> Self {
        let pending = round.status == TestStatus::Pending;
        RoundView {
            job_id,
            status: round.status,
            score: (!pending).then_some(round.score),
            pass_score: Some(round.pass_score),
            generated_by: Some(round.generated_by),
            submitted_at: round.submitted_at,
            questions: pending.then(|| round.question_views()),
        }
    }

    /// Company round for a candidate who already holds an application.
    fn admitted(job_id: Uuid) -> Self {
        RoundView {
            job_id,
            status: TestStatus::Passed,
            score: None,
            pass_score: None,
            generated_by: None,
            submitted_at: None,
            questions: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub job_id: Uuid,
    pub status: TestStatus,
    pub passed: bool,
    pub score: i32,
    pub pass_score: i32,
    pub submitted_at: DateTime<Utc>,
    /// Set when a passed company round admitted the candidate.
    pub application_id: Option<Uuid>,
    /// Set for work tests, where the outcome moves the application.
    pub application_status: Option<ApplicationStatus>,
}

fn require_answers(answers: &[SubmittedAnswer]) -> Result<(), AppError> {
    if answers.is_empty() {
        return Err(AppError::Validation("answers must not be empty".to_string()));
    }
    Ok(())
}

fn already_submitted(kind: &str) -> AppError {
    AppError::AlreadySubmitted(format!("This {kind} has already been submitted"))
}

/// A started round answers with its questions while pending and with status
/// only once passed; a failed round may not be retaken.
fn resume_round(job_id: Uuid, round: &RoundState, label: &str) -> Result<RoundView, AppError> {
    if round.status == TestStatus::Failed {
        return Err(AppError::NoReattempt(format!(
            "The {label} for this job was failed and cannot be retaken"
        )));
    }
    Ok(RoundView::of(job_id, round))
}

/// Eligibility, company and work-test rounds for candidates.
pub struct QualificationService {
    store: Arc<dyn Store>,
    questions: Arc<QuestionGenerator>,
    pass_score: i32,
    pipeline: Arc<ApplicationPipeline>,
}

impl QualificationService {
    pub fn new(
        store: Arc<dyn Store>,
        questions: Arc<QuestionGenerator>,
        pass_score: i32,
        pipeline: Arc<ApplicationPipeline>,
    ) -> Self {
        Self {
            store,
            questions,
            pass_score,
            pipeline,
        }
    }

    async fn qualification(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<QualificationRecord, AppError> {
        self.store
            .get_qualification(candidate_id, job_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Eligibility test not started for this job".to_string())
            })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Eligibility round
    // ────────────────────────────────────────────────────────────────────────

    /// Starts the eligibility round, or resumes the one already stored.
    /// Concurrent starts resolve to the single stored question set.
    pub async fn start_eligibility(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<RoundView, AppError> {
        let job = self.pipeline.open_job(job_id).await?;
        let label = RoundKind::Eligibility.label();

        if let Some(existing) = self.store.get_qualification(candidate_id, job_id).await? {
            return resume_round(job_id, &existing.eligibility, label);
        }

        let (questions, generated_by) = self
            .questions
            .generate(&job.title, &job.required_skills, GeneratedBy::Fallback)
            .await;
        let record = QualificationRecord::new(
            candidate_id,
            job_id,
            job.required_skills.clone(),
            RoundState::pending(questions, self.pass_score, generated_by),
        );
        let stored = self.store.insert_qualification_if_absent(&record).await?;
        if stored.id == record.id {
            info!(
                "Eligibility test started for job {job_id} ({} questions, {})",
                stored.eligibility.questions.len(),
                stored.eligibility.generated_by.as_str()
            );
        }
        resume_round(job_id, &stored.eligibility, label)
    }

    pub async fn eligibility_status(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<RoundView, AppError> {
        let record = self.qualification(candidate_id, job_id).await?;
        Ok(RoundView::of(job_id, &record.eligibility))
    }

    pub async fn submit_eligibility(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, AppError> {
        require_answers(answers)?;
        self.pipeline.open_job(job_id).await?;
        let record = self.qualification(candidate_id, job_id).await?;
        self.complete(candidate_id, job_id, RoundKind::Eligibility, &record, answers)
            .await
    }

    async fn complete(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        kind: RoundKind,
        record: &QualificationRecord,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, AppError> {
        let round = record.round(kind).ok_or_else(|| {
            AppError::NotFound(format!("{} not opened for this job", kind.label()))
        })?;
        if round.status.is_terminal() {
            return Err(already_submitted(kind.label()));
        }
        let outcome = grade(&round.questions, answers, round.pass_score, Utc::now());
        if !self
            .store
            .complete_round(candidate_id, job_id, kind, &outcome)
            .await?
        {
            return Err(already_submitted(kind.label()));
        }
        info!(
            "{} for job {job_id} graded {} ({})",
            kind.label(),
            outcome.score,
            outcome.status
        );
        Ok(SubmissionResult {
            job_id,
            status: outcome.status,
            passed: outcome.status == TestStatus::Passed,
            score: outcome.score,
            pass_score: round.pass_score,
            submitted_at: outcome.submitted_at,
            application_id: None,
            application_status: None,
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Company round
    // ────────────────────────────────────────────────────────────────────────

    /// Opens the recruiter's company round for a candidate who passed
    /// eligibility. The recruiter test is snapshotted on first open, so later
    /// edits to the job do not move an in-flight round.
    pub async fn open_company_test(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<RoundView, AppError> {
        let job = self.pipeline.open_job(job_id).await?;
        let label = RoundKind::Company.label();

        if self
            .store
            .find_application(candidate_id, job_id)
            .await?
            .is_some()
        {
            return Ok(RoundView::admitted(job_id));
        }

        let record = self.store.get_qualification(candidate_id, job_id).await?;
        let Some(record) = record.filter(|r| r.eligibility_passed()) else {
            return Err(AppError::GateNotSatisfied(
                "Pass the eligibility test for this job before taking the company test"
                    .to_string(),
            ));
        };

        if let Some(round) = &record.company {
            return resume_round(job_id, round, label);
        }

        let test = job
            .recruiter_test
            .as_ref()
            .filter(|_| job.has_company_test())
            .ok_or_else(|| {
                AppError::Validation("This job has no company test configured".to_string())
            })?;
        let round = RoundState::pending(
            normalize_question_ids(&test.questions, "cq"),
            test.pass_score,
            test.generated_by,
        );
        let stored = self
            .store
            .open_company_round(candidate_id, job_id, &round)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Eligibility test not started for this job".to_string())
            })?;
        resume_round(job_id, &stored, label)
    }

    /// Grades the company round; a pass admits the candidate through the
    /// pipeline, keeping any application that already exists.
    pub async fn submit_company_test(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, AppError> {
        require_answers(answers)?;
        let job = self.pipeline.open_job(job_id).await?;
        let record = self.qualification(candidate_id, job_id).await?;

        let mut result = self
            .complete(candidate_id, job_id, RoundKind::Company, &record, answers)
            .await?;
        if result.passed {
            let application = self.pipeline.ensure_application(candidate_id, &job).await?;
            result.application_id = Some(application.id);
            result.application_status = Some(application.status);
        }
        Ok(result)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Work test
    // ────────────────────────────────────────────────────────────────────────

    async fn owned_application(
        &self,
        candidate_id: Uuid,
        application_id: Uuid,
    ) -> Result<Application, AppError> {
        let application = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Application {application_id} not found"))
            })?;
        if application.candidate_id != candidate_id {
            return Err(AppError::Unauthorized(
                "This application belongs to another candidate".to_string(),
            ));
        }
        Ok(application)
    }

    pub async fn work_test(
        &self,
        candidate_id: Uuid,
        application_id: Uuid,
    ) -> Result<RoundView, AppError> {
        let application = self.owned_application(candidate_id, application_id).await?;
        let round = application.work_test.as_ref().ok_or_else(no_work_test)?;
        Ok(RoundView::of(application.job_id, round))
    }

    /// Grades the work test. The outcome moves the application itself:
    /// pass to `shortlisted`, fail to `rejected`.
    pub async fn submit_work_test(
        &self,
        candidate_id: Uuid,
        application_id: Uuid,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionResult, AppError> {
        require_answers(answers)?;
        let application = self.owned_application(candidate_id, application_id).await?;
        let round = application.work_test.as_ref().ok_or_else(no_work_test)?;
        if round.status.is_terminal() {
            return Err(already_submitted("work test"));
        }

        let outcome = grade(&round.questions, answers, round.pass_score, Utc::now());
        let status = if outcome.status == TestStatus::Passed {
            ApplicationStatus::Shortlisted
        } else {
            ApplicationStatus::Rejected
        };
        if !self
            .store
            .complete_work_test(application_id, &outcome, status)
            .await?
        {
            return Err(already_submitted("work test"));
        }
        info!(
            "Work test for application {application_id} graded {}; status {}",
            outcome.score,
            status.as_str()
        );

        Ok(SubmissionResult {
            job_id: application.job_id,
            status: outcome.status,
            passed: outcome.status == TestStatus::Passed,
            score: outcome.score,
            pass_score: round.pass_score,
            submitted_at: outcome.submitted_at,
            application_id: Some(application_id),
            application_status: Some(status),
        })
    }
}

fn no_work_test() -> AppError {
    AppError::NotFound("No work test has been assigned to this application".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::models::assessment::Question;
    use crate::models::job::JobStatus;
    use crate::pipeline::PipelineVariant;
    use crate::store::MemoryStore;
    use crate::test_support::{
        correct_answers, job, partial_answers, seed_job, seed_profile, seed_rounds,
    };

    struct Harness {
        store: Arc<MemoryStore>,
        pipeline: Arc<ApplicationPipeline>,
        service: QualificationService,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(ApplicationPipeline::new(
            store.clone(),
            PipelineVariant::DualTest,
        ));
        let service = QualificationService::new(
            store.clone(),
            Arc::new(QuestionGenerator::local_only()),
            60,
            pipeline.clone(),
        );
        Harness {
            store,
            pipeline,
            service,
        }
    }

    async fn stored_questions(h: &Harness, candidate: Uuid, job_id: Uuid, kind: RoundKind) -> Vec<Question> {
        let record = h.store.get_qualification(candidate, job_id).await.unwrap().unwrap();
        record.round(kind).unwrap().questions.clone()
    }

    #[tokio::test]
    async fn test_starting_twice_returns_same_questions() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react", "node"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();

        let first = h.service.start_eligibility(candidate, job.id).await.unwrap();
        let second = h.service.start_eligibility(candidate, job.id).await.unwrap();

        let ids = |v: &RoundView| -> Vec<String> {
            v.questions.as_ref().unwrap().iter().map(|q| q.question_id.clone()).collect()
        };
        assert!(ids(&first).len() >= 3);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.pass_score, Some(60));
        assert_eq!(first.generated_by, Some(GeneratedBy::Fallback));
    }

    #[tokio::test]
    async fn test_concurrent_starts_share_one_record() {
        let h = harness();
        let service = Arc::new(h.service);
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();

        let starts: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                let job_id = job.id;
                tokio::spawn(async move { service.start_eligibility(candidate, job_id).await })
            })
            .collect();
        for start in starts {
            assert_eq!(start.await.unwrap().unwrap().status, TestStatus::Pending);
        }
        assert!(h.store.get_qualification(candidate, job.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_views_never_expose_answer_key() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;

        let view = h.service.start_eligibility(Uuid::new_v4(), job.id).await.unwrap();
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("correct_answer"));
        assert!(!json.contains("correctAnswer"));
    }

    #[tokio::test]
    async fn test_three_of_five_at_sixty_passes() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react", "node", "sql", "docker", "git"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        h.service.start_eligibility(candidate, job.id).await.unwrap();
        let questions = stored_questions(&h, candidate, job.id, RoundKind::Eligibility).await;
        assert_eq!(questions.len(), 5);

        let result = h
            .service
            .submit_eligibility(candidate, job.id, &partial_answers(&questions, 3))
            .await
            .unwrap();
        assert_eq!(result.score, 60);
        assert!(result.passed);

        let status = h.service.eligibility_status(candidate, job.id).await.unwrap();
        assert_eq!(status.status, TestStatus::Passed);
        assert!(status.questions.is_none());
    }

    #[tokio::test]
    async fn test_second_submit_is_already_submitted() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        h.service.start_eligibility(candidate, job.id).await.unwrap();
        let questions = stored_questions(&h, candidate, job.id, RoundKind::Eligibility).await;

        h.service
            .submit_eligibility(candidate, job.id, &correct_answers(&questions))
            .await
            .unwrap();
        let err = h
            .service
            .submit_eligibility(candidate, job.id, &correct_answers(&questions))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn test_failed_eligibility_cannot_be_restarted() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Failed, None).await;

        let err = h.service.start_eligibility(candidate, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoReattempt(_)));
    }

    #[tokio::test]
    async fn test_passed_eligibility_start_returns_status_only() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Passed, None).await;

        let view = h.service.start_eligibility(candidate, job.id).await.unwrap();
        assert_eq!(view.status, TestStatus::Passed);
        assert!(view.questions.is_none());
    }

    #[tokio::test]
    async fn test_status_before_start_is_not_found() {
        let h = harness();
        let err = h
            .service
            .eligibility_status(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_submission_is_rejected() {
        let h = harness();
        let err = h
            .service
            .submit_eligibility(Uuid::new_v4(), Uuid::new_v4(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_expired_job_cannot_start_or_submit() {
        let h = harness();
        let mut job = job(Uuid::new_v4(), &["react"], true);
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Pending, None).await;
        job.status = JobStatus::Expired;
        seed_job(h.store.as_ref(), &job).await;

        let err = h.service.start_eligibility(Uuid::new_v4(), job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));
        let questions = stored_questions(&h, candidate, job.id, RoundKind::Eligibility).await;
        let err = h
            .service
            .submit_eligibility(candidate, job.id, &correct_answers(&questions))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));
    }

    #[tokio::test]
    async fn test_company_round_requires_eligibility() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;

        match h.service.open_company_test(Uuid::new_v4(), job.id).await.unwrap_err() {
            AppError::GateNotSatisfied(msg) => assert!(msg.contains("eligibility")),
            other => panic!("expected gate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_company_round_requires_recruiter_test() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], false);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Passed, None).await;

        let err = h.service.open_company_test(candidate, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_company_round_snapshots_recruiter_test_once() {
        let h = harness();
        let mut job = job(Uuid::new_v4(), &["react"], true);
        if let Some(test) = job.recruiter_test.as_mut() {
            test.pass_score = 70;
        }
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Passed, None).await;

        let view = h.service.open_company_test(candidate, job.id).await.unwrap();
        let ids: Vec<String> = view
            .questions
            .unwrap()
            .into_iter()
            .map(|q| q.question_id)
            .collect();
        assert_eq!(ids, vec!["cq1", "cq2", "cq3"]);
        assert_eq!(view.pass_score, Some(70));

        let again = h.service.open_company_test(candidate, job.id).await.unwrap();
        assert_eq!(again.questions.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_passing_company_round_creates_application() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react", "node"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_profile(h.store.as_ref(), candidate, &["react"]).await;
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Passed, None).await;

        h.service.open_company_test(candidate, job.id).await.unwrap();
        let questions = stored_questions(&h, candidate, job.id, RoundKind::Company).await;
        let result = h
            .service
            .submit_company_test(candidate, job.id, &correct_answers(&questions))
            .await
            .unwrap();

        assert!(result.passed);
        let application = h.store.find_application(candidate, job.id).await.unwrap().unwrap();
        assert_eq!(result.application_id, Some(application.id));
        assert_eq!(application.match_score, 50);

        let reopened = h.service.open_company_test(candidate, job.id).await.unwrap();
        assert_eq!(reopened.status, TestStatus::Passed);
        let err = h.pipeline.apply(candidate, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_failing_company_round_is_terminal() {
        let h = harness();
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let candidate = Uuid::new_v4();
        seed_rounds(h.store.as_ref(), candidate, &job, TestStatus::Passed, None).await;

        h.service.open_company_test(candidate, job.id).await.unwrap();
        let questions = stored_questions(&h, candidate, job.id, RoundKind::Company).await;
        let result = h
            .service
            .submit_company_test(candidate, job.id, &partial_answers(&questions, 0))
            .await
            .unwrap();

        assert!(!result.passed);
        assert!(result.application_id.is_none());
        assert!(h.store.find_application(candidate, job.id).await.unwrap().is_none());
        let err = h.service.open_company_test(candidate, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::NoReattempt(_)));
        let err = h.pipeline.apply(candidate, job.id).await.unwrap_err();
        assert!(matches!(err, AppError::GateNotSatisfied(_)));
    }

    async fn application_with_work_test(h: &Harness) -> (Application, Vec<Question>) {
        let job = job(Uuid::new_v4(), &["react"], true);
        seed_job(h.store.as_ref(), &job).await;
        let application = h.pipeline.ensure_application(Uuid::new_v4(), &job).await.unwrap();
        let questions = crate::assessment::questions::LocalQuestionSource::questions(
            &job.title,
            &job.required_skills,
        );
        let round = RoundState::pending(
            normalize_question_ids(&questions, "wq"),
            60,
            GeneratedBy::Fallback,
        );
        let stored = h
            .store
            .assign_work_test(application.id, &round)
            .await
            .unwrap()
            .unwrap();
        (application, stored.questions)
    }

    #[tokio::test]
    async fn test_work_test_pass_shortlists_application() {
        let h = harness();
        let (application, questions) = application_with_work_test(&h).await;

        let view = h.service.work_test(application.candidate_id, application.id).await.unwrap();
        assert_eq!(view.questions.unwrap().len(), questions.len());

        let result = h
            .service
            .submit_work_test(application.candidate_id, application.id, &correct_answers(&questions))
            .await
            .unwrap();
        assert_eq!(result.application_status, Some(ApplicationStatus::Shortlisted));

        let stored = h.store.get_application(application.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Shortlisted);
        assert!(stored.interview_invite.is_none());

        let err = h
            .service
            .submit_work_test(application.candidate_id, application.id, &correct_answers(&questions))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn test_work_test_fail_rejects_application() {
        let h = harness();
        let (application, questions) = application_with_work_test(&h).await;

        let result = h
            .service
            .submit_work_test(application.candidate_id, application.id, &partial_answers(&questions, 0))
            .await
            .unwrap();
        assert_eq!(result.application_status, Some(ApplicationStatus::Rejected));
    }

    #[tokio::test]
    async fn test_work_test_is_private_to_its_candidate() {
        let h = harness();
        let (application, _) = application_with_work_test(&h).await;

        let err = h.service.work_test(Uuid::new_v4(), application.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_company_round_on_lapsed_deadline_is_expired() {
        let h = harness();
        let mut job = job(Uuid::new_v4(), &["react"], true);
        job.deadline_at = Utc::now() - Duration::seconds(1);
        seed_job(h.store.as_ref(), &job).await;

        let err = h.service.open_company_test(Uuid::new_v4(), job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));
    }
}
