//! Fixtures shared by service and router tests.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::assessment::{
    GeneratedBy, QualificationRecord, Question, RoundOutcome, RoundState, SubmittedAnswer,
    TestStatus,
};
use crate::models::job::{Job, JobStatus, RecruiterTest};
use crate::models::profile::{CandidateProfile, PersonalDetails, PublicProfile};
use crate::store::Store;

pub fn skills(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn recruiter_test(pass_score: i32) -> RecruiterTest {
    let questions = (1..=3)
        .map(|i| Question {
            question_id: "dup".to_string(),
            question: format!("Company question {i}"),
            options: vec![format!("Yes {i}"), format!("No {i}")],
            correct_answer: format!("Yes {i}"),
        })
        .collect();
    RecruiterTest {
        questions,
        pass_score,
        generated_by: GeneratedBy::Manual,
    }
}

pub fn job(recruiter_id: Uuid, required: &[&str], with_test: bool) -> Job {
    Job {
        id: Uuid::new_v4(),
        recruiter_id,
        title: "Backend Engineer".to_string(),
        description: "Build and run the hiring services".to_string(),
        required_skills: skills(required),
        experience_level: "mid".to_string(),
        location: "Remote".to_string(),
        salary_range: String::new(),
        deadline_at: Utc::now() + Duration::days(7),
        status: JobStatus::Active,
        recruiter_test: with_test.then(|| recruiter_test(60)),
        created_at: Utc::now(),
    }
}

pub async fn seed_job(store: &dyn Store, job: &Job) {
    store.insert_job(job).await.expect("seed job");
}

pub fn profile(candidate_skills: &[&str]) -> CandidateProfile {
    CandidateProfile {
        personal: PersonalDetails {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            college: "Northfield Institute".to_string(),
            github_link: "https://github.com/asha".to_string(),
            ..Default::default()
        },
        public: PublicProfile {
            skills: skills(candidate_skills),
            experience_years: 3,
            city: "Pune".to_string(),
            ..Default::default()
        },
    }
}

pub async fn seed_profile(store: &dyn Store, candidate_id: Uuid, candidate_skills: &[&str]) {
    store
        .save_profile(candidate_id, &profile(candidate_skills))
        .await
        .expect("seed profile");
}

fn terminal(status: TestStatus) -> RoundOutcome {
    RoundOutcome {
        score: if status == TestStatus::Passed { 100 } else { 0 },
        status,
        answers: vec![],
        submitted_at: Utc::now(),
    }
}

/// Writes qualification state straight into the store, bypassing the services.
pub async fn seed_rounds(
    store: &dyn Store,
    candidate_id: Uuid,
    job: &Job,
    eligibility: TestStatus,
    company: Option<TestStatus>,
) {
    let questions = crate::assessment::questions::LocalQuestionSource::questions(
        &job.title,
        &job.required_skills,
    );
    let record = QualificationRecord::new(
        candidate_id,
        job.id,
        job.required_skills.clone(),
        RoundState::pending(questions, 60, GeneratedBy::Fallback),
    );
    store
        .insert_qualification_if_absent(&record)
        .await
        .expect("seed qualification");
    if eligibility.is_terminal() {
        store
            .complete_round(candidate_id, job.id, crate::models::assessment::RoundKind::Eligibility, &terminal(eligibility))
            .await
            .expect("seed eligibility");
    }
    if let Some(company) = company {
        let test = job.recruiter_test.clone().unwrap_or_else(|| recruiter_test(60));
        let round = RoundState::pending(test.questions, test.pass_score, test.generated_by);
        store
            .open_company_round(candidate_id, job.id, &round)
            .await
            .expect("seed company round");
        if company.is_terminal() {
            store
                .complete_round(candidate_id, job.id, crate::models::assessment::RoundKind::Company, &terminal(company))
                .await
                .expect("seed company outcome");
        }
    }
}

pub fn correct_answers(questions: &[Question]) -> Vec<SubmittedAnswer> {
    questions
        .iter()
        .map(|q| SubmittedAnswer {
            question_id: q.question_id.clone(),
            answer: q.correct_answer.clone(),
        })
        .collect()
}

/// First `right` questions answered correctly, the rest wrong.
pub fn partial_answers(questions: &[Question], right: usize) -> Vec<SubmittedAnswer> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let answer = if i < right {
                q.correct_answer.clone()
            } else {
                q.options
                    .iter()
                    .find(|o| **o != q.correct_answer)
                    .cloned()
                    .unwrap_or_default()
            };
            SubmittedAnswer {
                question_id: q.question_id.clone(),
                answer,
            }
        })
        .collect()
}
