use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assessment::{GeneratedBy, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Expired,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Expired => "expired",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "expired" => Ok(JobStatus::Expired),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// Recruiter-authored (or AI-drafted) quiz that backs the company round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterTest {
    pub questions: Vec<Question>,
    pub pass_score: i32,
    pub generated_by: GeneratedBy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_level: String,
    pub location: String,
    pub salary_range: String,
    pub deadline_at: DateTime<Utc>,
    pub status: JobStatus,
    pub recruiter_test: Option<RecruiterTest>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Expiry is evaluated on read: an explicit `expired` flag or a deadline
    /// at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Expired || self.deadline_at <= now
    }

    pub fn effective_status(&self, now: DateTime<Utc>) -> JobStatus {
        if self.is_expired(now) {
            JobStatus::Expired
        } else {
            JobStatus::Active
        }
    }

    pub fn has_company_test(&self) -> bool {
        self.recruiter_test
            .as_ref()
            .is_some_and(|test| !test.questions.is_empty())
    }

    pub fn is_owned_by(&self, recruiter_id: Uuid) -> bool {
        self.recruiter_id == recruiter_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(deadline_at: DateTime<Utc>, status: JobStatus) -> Job {
        Job {
            id: Uuid::new_v4(),
            recruiter_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            required_skills: vec!["rust".to_string()],
            experience_level: String::new(),
            location: String::new(),
            salary_range: String::new(),
            deadline_at,
            status,
            recruiter_test: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_deadline_in_past_is_expired() {
        let now = Utc::now();
        let j = job(now - Duration::minutes(1), JobStatus::Active);
        assert!(j.is_expired(now));
        assert_eq!(j.effective_status(now), JobStatus::Expired);
    }

    #[test]
    fn test_deadline_equal_to_now_is_expired() {
        let now = Utc::now();
        assert!(job(now, JobStatus::Active).is_expired(now));
    }

    #[test]
    fn test_explicit_expiry_wins_over_future_deadline() {
        let now = Utc::now();
        assert!(job(now + Duration::days(3), JobStatus::Expired).is_expired(now));
    }

    #[test]
    fn test_empty_recruiter_test_is_not_a_company_test() {
        let mut j = job(Utc::now() + Duration::days(1), JobStatus::Active);
        assert!(!j.has_company_test());
        j.recruiter_test = Some(RecruiterTest {
            questions: vec![],
            pass_score: 60,
            generated_by: GeneratedBy::Manual,
        });
        assert!(!j.has_company_test());
    }
}
