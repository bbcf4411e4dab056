use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus, InterviewInvite};
use crate::models::assessment::{
    QualificationRecord, RoundKind, RoundOutcome, RoundState, TestStatus,
};
use crate::models::job::{Job, JobStatus, RecruiterTest};
use crate::models::profile::{CandidateProfile, CandidateRecord};
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    jobs: HashMap<Uuid, Job>,
    candidates: HashMap<Uuid, CandidateRecord>,
    qualifications: HashMap<(Uuid, Uuid), QualificationRecord>,
    applications: HashMap<Uuid, Application>,
}

/// In-process store. One mutex guards every table so each trait method is
/// atomic, mirroring the single-statement guarantees of `PgStore`.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict(format!("job {}", job.id)));
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.lock()?.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self.lock()?.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn list_jobs_for_recruiter(&self, recruiter_id: Uuid) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn set_recruiter_test(
        &self,
        job_id: Uuid,
        test: &RecruiterTest,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        Ok(match tables.jobs.get_mut(&job_id) {
            Some(job) => {
                job.recruiter_test = Some(test.clone());
                true
            }
            None => false,
        })
    }

    async fn mark_job_expired(&self, job_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        Ok(match tables.jobs.get_mut(&job_id) {
            Some(job) => {
                job.status = JobStatus::Expired;
                true
            }
            None => false,
        })
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRecord>, StoreError> {
        Ok(self.lock()?.candidates.get(&id).cloned())
    }

    async fn save_profile(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
    ) -> Result<CandidateRecord, StoreError> {
        let mut tables = self.lock()?;
        let record = tables
            .candidates
            .entry(id)
            .or_insert_with(|| CandidateRecord::empty(id));
        record.profile = profile.clone();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn assign_public_id(&self, id: Uuid, public_id: &str) -> Result<String, StoreError> {
        let mut tables = self.lock()?;
        let taken = tables
            .candidates
            .values()
            .any(|c| c.id != id && c.public_id.as_deref() == Some(public_id));
        let assigned = tables.candidates.get(&id).and_then(|c| c.public_id.clone());
        if taken && assigned.is_none() {
            return Err(StoreError::Conflict(format!(
                "public id {public_id} belongs to another candidate"
            )));
        }
        let record = tables
            .candidates
            .entry(id)
            .or_insert_with(|| CandidateRecord::empty(id));
        Ok(record
            .public_id
            .get_or_insert_with(|| public_id.to_string())
            .clone())
    }

    async fn get_qualification(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<QualificationRecord>, StoreError> {
        Ok(self
            .lock()?
            .qualifications
            .get(&(candidate_id, job_id))
            .cloned())
    }

    async fn insert_qualification_if_absent(
        &self,
        record: &QualificationRecord,
    ) -> Result<QualificationRecord, StoreError> {
        let mut tables = self.lock()?;
        Ok(tables
            .qualifications
            .entry((record.candidate_id, record.job_id))
            .or_insert_with(|| record.clone())
            .clone())
    }

    async fn open_company_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError> {
        let mut tables = self.lock()?;
        let Some(record) = tables.qualifications.get_mut(&(candidate_id, job_id)) else {
            return Ok(None);
        };
        if record.company.is_none() {
            record.company = Some(round.clone());
            record.updated_at = Utc::now();
        }
        Ok(record.company.clone())
    }

    async fn complete_round(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
        kind: RoundKind,
        outcome: &RoundOutcome,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let Some(record) = tables.qualifications.get_mut(&(candidate_id, job_id)) else {
            return Ok(false);
        };
        let round = match kind {
            RoundKind::Eligibility => Some(&mut record.eligibility),
            RoundKind::Company => record.company.as_mut(),
        };
        match round {
            Some(round) if round.status == TestStatus::Pending => {
                round.apply(outcome);
                record.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_application(&self, application: &Application) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let duplicate = tables.applications.values().any(|existing| {
            existing.job_id == application.job_id
                && existing.candidate_id == application.candidate_id
        });
        if duplicate || tables.applications.contains_key(&application.id) {
            return Err(StoreError::Conflict(format!(
                "application for candidate {} on job {}",
                application.candidate_id, application.job_id
            )));
        }
        tables.applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    async fn find_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .lock()?
            .applications
            .values()
            .find(|a| a.candidate_id == candidate_id && a.job_id == job_id)
            .cloned())
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let mut applications: Vec<Application> = self
            .lock()?
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(applications)
    }

    async fn list_applications_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<Application>, StoreError> {
        let mut applications: Vec<Application> = self
            .lock()?
            .applications
            .values()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    async fn record_interview_invite(
        &self,
        id: Uuid,
        invite: &InterviewInvite,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.applications.get_mut(&id) {
            Some(app) if app.status != ApplicationStatus::Rejected => {
                app.status = ApplicationStatus::Shortlisted;
                app.interview_invite.get_or_insert_with(|| invite.clone());
                app.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn assign_work_test(
        &self,
        id: Uuid,
        round: &RoundState,
    ) -> Result<Option<RoundState>, StoreError> {
        let mut tables = self.lock()?;
        let Some(app) = tables.applications.get_mut(&id) else {
            return Ok(None);
        };
        if app.work_test.is_none() {
            app.work_test = Some(round.clone());
            app.updated_at = Utc::now();
        }
        Ok(app.work_test.clone())
    }

    async fn complete_work_test(
        &self,
        id: Uuid,
        outcome: &RoundOutcome,
        status: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let Some(app) = tables.applications.get_mut(&id) else {
            return Ok(false);
        };
        match app.work_test.as_mut() {
            Some(round) if round.status == TestStatus::Pending => {
                round.apply(outcome);
                app.status = status;
                app.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn override_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        Ok(match tables.applications.get_mut(&id) {
            Some(app) => {
                app.status = status;
                app.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{DisplayProfile, PrivateProfile};
    use crate::models::assessment::{GeneratedBy, Question};

    fn record(candidate_id: Uuid, job_id: Uuid, tag: &str) -> QualificationRecord {
        let question = Question {
            question_id: tag.to_string(),
            question: format!("question {tag}"),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: "a".to_string(),
        };
        QualificationRecord::new(
            candidate_id,
            job_id,
            vec!["rust".to_string()],
            RoundState::pending(vec![question], 60, GeneratedBy::Fallback),
        )
    }

    fn application(candidate_id: Uuid, job_id: Uuid) -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            job_id,
            recruiter_id: Uuid::new_v4(),
            candidate_id,
            anonymous_id: "CAND-0000AAAA".to_string(),
            match_score: 50,
            matched_skills: vec![],
            missing_skills: vec![],
            status: ApplicationStatus::Applied,
            display_profile: DisplayProfile::default(),
            private_profile: PrivateProfile::default(),
            interview_invite: None,
            work_test: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn outcome(status: TestStatus) -> RoundOutcome {
        RoundOutcome {
            score: 100,
            status,
            answers: vec![],
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_first_qualification_insert_wins() {
        let store = MemoryStore::new();
        let (candidate, job) = (Uuid::new_v4(), Uuid::new_v4());
        let first = store
            .insert_qualification_if_absent(&record(candidate, job, "first"))
            .await
            .unwrap();
        let second = store
            .insert_qualification_if_absent(&record(candidate, job, "second"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.eligibility.questions[0].question_id, "first");
    }

    #[tokio::test]
    async fn test_complete_round_is_compare_and_set() {
        let store = MemoryStore::new();
        let (candidate, job) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .insert_qualification_if_absent(&record(candidate, job, "q1"))
            .await
            .unwrap();

        let first = store
            .complete_round(candidate, job, RoundKind::Eligibility, &outcome(TestStatus::Passed))
            .await
            .unwrap();
        let second = store
            .complete_round(candidate, job, RoundKind::Eligibility, &outcome(TestStatus::Failed))
            .await
            .unwrap();
        assert!(first);
        assert!(!second);
        let stored = store.get_qualification(candidate, job).await.unwrap().unwrap();
        assert_eq!(stored.eligibility.status, TestStatus::Passed);
    }

    #[tokio::test]
    async fn test_concurrent_application_inserts_yield_one_row() {
        let store = MemoryStore::new();
        let (candidate, job) = (Uuid::new_v4(), Uuid::new_v4());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert_application(&application(candidate, job)).await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(StoreError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.list_applications_for_candidate(candidate).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_public_id_is_assigned_once() {
        let store = MemoryStore::new();
        let candidate = Uuid::new_v4();
        let first = store.assign_public_id(candidate, "CAND-AAAA1111").await.unwrap();
        let second = store.assign_public_id(candidate, "CAND-BBBB2222").await.unwrap();
        assert_eq!(first, "CAND-AAAA1111");
        assert_eq!(second, "CAND-AAAA1111");
    }

    #[tokio::test]
    async fn test_public_id_is_unique_across_candidates() {
        let store = MemoryStore::new();
        store.assign_public_id(Uuid::new_v4(), "CAND-AAAA1111").await.unwrap();
        let err = store
            .assign_public_id(Uuid::new_v4(), "CAND-AAAA1111")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invite_is_not_recorded_twice_or_on_rejected() {
        let store = MemoryStore::new();
        let mut app = application(Uuid::new_v4(), Uuid::new_v4());
        store.insert_application(&app).await.unwrap();
        let invite = InterviewInvite {
            sent_at: Utc::now(),
            message: "hello".to_string(),
        };
        let later = InterviewInvite {
            sent_at: Utc::now(),
            message: "again".to_string(),
        };
        assert!(store.record_interview_invite(app.id, &invite).await.unwrap());
        store
            .override_status(app.id, ApplicationStatus::Applied)
            .await
            .unwrap();
        assert!(store.record_interview_invite(app.id, &later).await.unwrap());
        let stored = store.get_application(app.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Shortlisted);
        assert_eq!(stored.interview_invite, Some(invite.clone()));

        app = application(Uuid::new_v4(), Uuid::new_v4());
        app.status = ApplicationStatus::Rejected;
        store.insert_application(&app).await.unwrap();
        assert!(!store.record_interview_invite(app.id, &invite).await.unwrap());
    }
}
