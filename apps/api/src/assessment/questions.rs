//! Question generation.
//!
//! `QuestionSource` is the capability; `LlmQuestionSource` drafts questions
//! remotely and `LocalQuestionSource` builds them deterministically from the
//! job's skills. `QuestionGenerator` picks the remote source when one is
//! configured, bounds it with a timeout, and falls back to the local source
//! on any failure, so callers never see a generation error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::prompts::question_prompt;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::assessment::{GeneratedBy, Question};
use crate::models::profile::clean_skills;

pub const MAX_QUESTIONS: usize = 5;
pub const MIN_QUESTIONS: usize = 3;
const MAX_OPTIONS: usize = 4;
const GENERIC_SKILLS: [&str; 3] = ["communication", "problem solving", "teamwork"];

#[derive(Debug, Error)]
pub enum QuestionSourceError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("only {0} usable questions generated")]
    TooFew(usize),
}

#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(
        &self,
        job_title: &str,
        required_skills: &[String],
    ) -> Result<Vec<Question>, QuestionSourceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Loosely-typed question as produced by a model or submitted by a recruiter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DraftQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
}

#[derive(Debug, Deserialize)]
struct DraftQuestionSet {
    #[serde(default)]
    questions: Vec<DraftQuestion>,
}

/// Cleans one draft: trimmed text, non-blank options (first four kept), and a
/// correct answer that is one of them.
fn clean_draft(draft: &DraftQuestion) -> Result<(String, Vec<String>, String), String> {
    let question = draft.question.trim().to_string();
    if question.is_empty() {
        return Err("question text is empty".to_string());
    }
    let options: Vec<String> = draft
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .take(MAX_OPTIONS)
        .collect();
    if options.len() < 2 {
        return Err(format!("'{question}' needs at least two options"));
    }
    let correct = draft.correct_answer.trim().to_string();
    if !options.contains(&correct) {
        return Err(format!("'{question}' has a correct answer that is not among its options"));
    }
    Ok((question, options, correct))
}

fn numbered(prefix: &str, cleaned: Vec<(String, Vec<String>, String)>) -> Vec<Question> {
    cleaned
        .into_iter()
        .enumerate()
        .map(|(i, (question, options, correct_answer))| Question {
            question_id: format!("{prefix}{}", i + 1),
            question,
            options,
            correct_answer,
        })
        .collect()
}

/// Keeps the valid drafts (at most five), renumbered `q1..`. Invalid drafts
/// are dropped silently; the caller decides whether enough survived.
pub fn normalize_generated(drafts: &[DraftQuestion]) -> Vec<Question> {
    let cleaned = drafts
        .iter()
        .filter_map(|d| clean_draft(d).ok())
        .take(MAX_QUESTIONS)
        .collect();
    numbered("q", cleaned)
}

/// Strict variant for recruiter-authored tests: any invalid question rejects
/// the whole set.
pub fn validate_authored(drafts: &[DraftQuestion]) -> Result<Vec<Question>, String> {
    if drafts.is_empty() {
        return Err("A test needs at least one question".to_string());
    }
    let cleaned = drafts
        .iter()
        .enumerate()
        .map(|(i, d)| clean_draft(d).map_err(|e| format!("Question {}: {e}", i + 1)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(numbered("q", cleaned))
}

/// Re-issues ids as `{prefix}1..{prefix}N` so every id in a round is unique.
pub fn normalize_question_ids(questions: &[Question], prefix: &str) -> Vec<Question> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| Question {
            question_id: format!("{prefix}{}", i + 1),
            ..q.clone()
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Local source
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic generator: one question per required skill (up to five),
/// padded with generic competencies so there are always at least three.
pub struct LocalQuestionSource;

impl LocalQuestionSource {
    pub fn questions(job_title: &str, required_skills: &[String]) -> Vec<Question> {
        let role = if job_title.trim().is_empty() {
            "this role"
        } else {
            job_title.trim()
        };

        let mut skills = clean_skills(required_skills);
        skills.truncate(MAX_QUESTIONS);
        for generic in GENERIC_SKILLS {
            if skills.len() >= MIN_QUESTIONS {
                break;
            }
            if !skills.iter().any(|s| s.eq_ignore_ascii_case(generic)) {
                skills.push(generic.to_string());
            }
        }

        skills
            .iter()
            .enumerate()
            .map(|(i, skill)| {
                let correct = format!("I can explain and use {skill} in projects");
                Question {
                    question_id: format!("q{}", i + 1),
                    question: format!(
                        "Which option best demonstrates practical knowledge of {skill} for the role {role}?"
                    ),
                    options: vec![
                        correct.clone(),
                        format!("I have only heard the term {skill}"),
                        format!("I never worked with {skill}"),
                        format!("I avoid tasks requiring {skill}"),
                    ],
                    correct_answer: correct,
                }
            })
            .collect()
    }
}

#[async_trait]
impl QuestionSource for LocalQuestionSource {
    async fn generate(
        &self,
        job_title: &str,
        required_skills: &[String],
    ) -> Result<Vec<Question>, QuestionSourceError> {
        Ok(Self::questions(job_title, required_skills))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM source
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionSource {
    llm: LlmClient,
}

impl LlmQuestionSource {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    async fn generate(
        &self,
        job_title: &str,
        required_skills: &[String],
    ) -> Result<Vec<Question>, QuestionSourceError> {
        let prompt = question_prompt(job_title, required_skills, MAX_QUESTIONS);
        let set: DraftQuestionSet = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        let questions = normalize_generated(&set.questions);
        if questions.len() < MIN_QUESTIONS {
            return Err(QuestionSourceError::TooFew(questions.len()));
        }
        Ok(questions)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

pub struct QuestionGenerator {
    remote: Option<Arc<dyn QuestionSource>>,
    timeout: Duration,
}

impl QuestionGenerator {
    pub fn new(remote: Option<Arc<dyn QuestionSource>>, timeout: Duration) -> Self {
        Self { remote, timeout }
    }

    pub fn local_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Returns questions and their provenance. Remote output is tagged `ai`;
    /// local output gets `fallback_tag` (`fallback` for eligibility rounds,
    /// `manual` for recruiter drafts).
    pub async fn generate(
        &self,
        job_title: &str,
        required_skills: &[String],
        fallback_tag: GeneratedBy,
    ) -> (Vec<Question>, GeneratedBy) {
        if let Some(remote) = &self.remote {
            match tokio::time::timeout(self.timeout, remote.generate(job_title, required_skills))
                .await
            {
                Ok(Ok(questions)) if questions.len() >= MIN_QUESTIONS => {
                    info!("Generated {} questions remotely for '{job_title}'", questions.len());
                    return (questions, GeneratedBy::Ai);
                }
                Ok(Ok(questions)) => {
                    warn!("Remote question source returned {} questions; using local", questions.len());
                }
                Ok(Err(e)) => warn!("Remote question source failed: {e}; using local"),
                Err(_) => warn!(
                    "Remote question source timed out after {:?}; using local",
                    self.timeout
                ),
            }
        }
        (
            LocalQuestionSource::questions(job_title, required_skills),
            fallback_tag,
        )
    }
}
