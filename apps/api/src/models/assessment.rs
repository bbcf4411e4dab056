use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored multiple-choice question. `correct_answer` is server-only:
/// anything sent to a test-taker must go through [`QuestionView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Test-taker projection of a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        QuestionView {
            question_id: q.question_id.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pending,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pending => "pending",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TestStatus::Pending),
            "passed" => Ok(TestStatus::Passed),
            "failed" => Ok(TestStatus::Failed),
            other => Err(format!("unknown test status '{other}'")),
        }
    }
}

/// Where a question set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedBy {
    Ai,
    Fallback,
    Manual,
}

impl GeneratedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratedBy::Ai => "ai",
            GeneratedBy::Fallback => "fallback",
            GeneratedBy::Manual => "manual",
        }
    }
}

impl FromStr for GeneratedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(GeneratedBy::Ai),
            "fallback" => Ok(GeneratedBy::Fallback),
            "manual" => Ok(GeneratedBy::Manual),
            other => Err(format!("unknown generator tag '{other}'")),
        }
    }
}

/// One quiz instance: eligibility, company round, or an application's work test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub questions: Vec<Question>,
    pub pass_score: i32,
    pub score: i32,
    pub status: TestStatus,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    pub generated_by: GeneratedBy,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl RoundState {
    pub fn pending(questions: Vec<Question>, pass_score: i32, generated_by: GeneratedBy) -> Self {
        RoundState {
            questions,
            pass_score,
            score: 0,
            status: TestStatus::Pending,
            answers: Vec::new(),
            generated_by,
            submitted_at: None,
        }
    }

    pub fn question_views(&self) -> Vec<QuestionView> {
        self.questions.iter().map(QuestionView::from).collect()
    }

    pub fn apply(&mut self, outcome: &RoundOutcome) {
        self.score = outcome.score;
        self.status = outcome.status;
        self.answers = outcome.answers.clone();
        self.submitted_at = Some(outcome.submitted_at);
    }
}

/// Progress of a round without its questions or answers; safe to show to
/// either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub status: TestStatus,
    pub score: Option<i32>,
    pub pass_score: i32,
    pub question_count: usize,
    pub generated_by: GeneratedBy,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<&RoundState> for RoundSummary {
    fn from(round: &RoundState) -> Self {
        RoundSummary {
            status: round.status,
            score: round.status.is_terminal().then_some(round.score),
            pass_score: round.pass_score,
            question_count: round.questions.len(),
            generated_by: round.generated_by,
            submitted_at: round.submitted_at,
        }
    }
}

/// Result of grading a submission; written with compare-and-set on `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub score: i32,
    pub status: TestStatus,
    pub answers: Vec<SubmittedAnswer>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    Eligibility,
    Company,
}

impl RoundKind {
    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::Eligibility => "eligibility test",
            RoundKind::Company => "company test",
        }
    }
}

/// Per (candidate, job) qualification record. The company round is opened
/// lazily once the eligibility round has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub required_skills_snapshot: Vec<String>,
    pub eligibility: RoundState,
    pub company: Option<RoundState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QualificationRecord {
    pub fn new(
        candidate_id: Uuid,
        job_id: Uuid,
        required_skills: Vec<String>,
        eligibility: RoundState,
    ) -> Self {
        let now = Utc::now();
        QualificationRecord {
            id: Uuid::new_v4(),
            candidate_id,
            job_id,
            required_skills_snapshot: required_skills,
            eligibility,
            company: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn round(&self, kind: RoundKind) -> Option<&RoundState> {
        match kind {
            RoundKind::Eligibility => Some(&self.eligibility),
            RoundKind::Company => self.company.as_ref(),
        }
    }

    pub fn eligibility_passed(&self) -> bool {
        self.eligibility.status == TestStatus::Passed
    }

    pub fn company_passed(&self) -> bool {
        self.company
            .as_ref()
            .is_some_and(|round| round.status == TestStatus::Passed)
    }
}
