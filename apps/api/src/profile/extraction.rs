use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::anonymizer::{EMAIL_RE, PHONE_RE};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::profile::{
    clean_skills, CandidateProfile, Education, Experience, PersonalDetails, Project, PublicProfile,
};
use crate::profile::prompts::extraction_prompt;

/// Skills recognised by the local extractor.
pub const KNOWN_SKILLS: [&str; 16] = [
    "javascript",
    "typescript",
    "react",
    "node",
    "express",
    "mongodb",
    "sql",
    "python",
    "java",
    "docker",
    "kubernetes",
    "aws",
    "html",
    "css",
    "tailwind",
    "git",
];

const MAX_NAME_CHARS: usize = 80;
const MAX_NAME_WORDS: usize = 5;

lazy_static! {
    static ref LINKEDIN_RE: Regex =
        Regex::new(r"(?i)https?://(?:www\.)?linkedin\.com/[^\s)]+").expect("linkedin regex is valid");
    static ref GITHUB_RE: Regex =
        Regex::new(r"(?i)https?://(?:www\.)?github\.com/[^\s)]+").expect("github regex is valid");
    static ref YEARS_RE: Regex =
        Regex::new(r"(?i)(\d{1,2})\+?\s*(?:years|yrs)").expect("years regex is valid");
    static ref COLLEGE_RE: Regex =
        Regex::new(r"(?i)university|college|institute|school").expect("college regex is valid");
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z.\s'-]+$").expect("name regex is valid");
    static ref WORD_RE: Regex = Regex::new(r"[a-z]+").expect("word regex is valid");
}

// ────────────────────────────────────────────────────────────────────────────
// Resume text
// ────────────────────────────────────────────────────────────────────────────

/// Reads an uploaded resume as text: PDF through `pdf-extract`, anything
/// declared as plain text as UTF-8.
pub async fn resume_text(
    bytes: &[u8],
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, AppError> {
    let name = file_name.unwrap_or_default().to_ascii_lowercase();
    let mime = content_type.unwrap_or_default().to_ascii_lowercase();

    let text = if mime.contains("pdf") || name.ends_with(".pdf") {
        let pdf = bytes.to_vec();
        parse_off_runtime(move || {
            pdf_extract::extract_text_from_mem(&pdf).unwrap_or_else(|e| {
                warn!("PDF text extraction failed: {e}");
                String::new()
            })
        })
        .await?
    } else if mime.starts_with("text/") || name.ends_with(".txt") {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        return Err(AppError::Validation(
            "Only PDF or plain-text resumes are supported".to_string(),
        ));
    };

    if text.trim().is_empty() {
        return Err(no_readable_text());
    }
    Ok(text)
}

fn no_readable_text() -> AppError {
    AppError::Validation("No readable text found in the uploaded resume".to_string())
}

/// Runs a CPU-bound parse on the blocking pool. A panic inside the parser
/// means the document is unreadable, not that the server failed.
async fn parse_off_runtime<F>(parse: F) -> Result<String, AppError>
where
    F: FnOnce() -> String + Send + 'static,
{
    tokio::task::spawn_blocking(parse).await.map_err(|e| {
        if e.is_panic() {
            warn!("Resume parser panicked on upload");
            no_readable_text()
        } else {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in resume parsing: {e}"))
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProfileSourceError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model reply had no usable profile fields")]
    Empty,
}

/// Turns resume text into profile fields.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn extract(&self, resume_text: &str) -> Result<CandidateProfile, ProfileSourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Ai,
    Local,
}

/// Regex heuristics; always succeeds.
pub struct LocalProfileSource;

impl LocalProfileSource {
    pub fn profile(text: &str) -> CandidateProfile {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let first_match = |re: &Regex| {
            re.find(text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        let full_name = lines
            .first()
            .filter(|line| {
                line.chars().count() <= MAX_NAME_CHARS
                    && NAME_RE.is_match(line)
                    && line.split_whitespace().count() <= MAX_NAME_WORDS
            })
            .map(|line| line.to_string())
            .unwrap_or_default();

        let college = lines
            .iter()
            .find(|line| COLLEGE_RE.is_match(line))
            .map(|line| line.to_string())
            .unwrap_or_default();

        let experience_years = YEARS_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .unwrap_or(0);

        let words: HashSet<String> = WORD_RE
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect();
        let skills = KNOWN_SKILLS
            .iter()
            .filter(|skill| words.contains(**skill))
            .map(|skill| skill.to_string())
            .collect();

        CandidateProfile {
            personal: PersonalDetails {
                full_name,
                email: first_match(&EMAIL_RE),
                phone: normalize_phone(&first_match(&PHONE_RE)),
                college,
                github_link: first_match(&GITHUB_RE),
                linkedin_link: first_match(&LINKEDIN_RE),
                ..Default::default()
            },
            public: PublicProfile {
                skills,
                experience_years,
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl ProfileSource for LocalProfileSource {
    async fn extract(&self, resume_text: &str) -> Result<CandidateProfile, ProfileSourceError> {
        Ok(Self::profile(resume_text))
    }
}

/// Keeps a phone candidate only when it carries 10 to 12 digits.
fn normalize_phone(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let digits = collapsed.chars().filter(char::is_ascii_digit).count();
    if (10..=12).contains(&digits) {
        collapsed
    } else {
        String::new()
    }
}

pub struct LlmProfileSource {
    llm: LlmClient,
}

impl LlmProfileSource {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProfileSource for LlmProfileSource {
    async fn extract(&self, resume_text: &str) -> Result<CandidateProfile, ProfileSourceError> {
        let prompt = extraction_prompt(resume_text);
        let raw: CandidateProfile = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        let profile = tidy(raw);
        if profile == CandidateProfile::default() {
            return Err(ProfileSourceError::Empty);
        }
        Ok(profile)
    }
}

/// Trims model output and drops list entries with nothing in them.
fn tidy(mut profile: CandidateProfile) -> CandidateProfile {
    let p = &mut profile.personal;
    for field in [
        &mut p.full_name,
        &mut p.email,
        &mut p.phone,
        &mut p.gender,
        &mut p.college,
        &mut p.address,
        &mut p.bio,
        &mut p.github_link,
        &mut p.linkedin_link,
        &mut p.current_role,
        &mut p.current_company,
    ] {
        *field = field.trim().to_string();
    }
    p.resume_text.clear();

    let public = &mut profile.public;
    public.skills = clean_skills(&public.skills);
    public.experience_years = public.experience_years.max(0);
    public.tagline = public.tagline.trim().to_string();
    public.portfolio_link = public.portfolio_link.trim().to_string();
    public.city = public.city.trim().to_string();
    public.projects.retain(|p: &Project| {
        !(p.title.trim().is_empty()
            && p.description.trim().is_empty()
            && p.link.trim().is_empty()
            && p.technologies.is_empty())
    });
    public.education.retain(|e: &Education| {
        !(e.school.trim().is_empty()
            && e.degree.trim().is_empty()
            && e.field_of_study.trim().is_empty())
    });
    public.experience.retain(|x: &Experience| {
        !(x.company.trim().is_empty() && x.role.trim().is_empty() && x.description.trim().is_empty())
    });
    public.resume_anonymized = None;
    profile
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

pub struct ResumeExtractor {
    remote: Option<Arc<dyn ProfileSource>>,
    timeout: Duration,
}

impl ResumeExtractor {
    pub fn new(remote: Option<Arc<dyn ProfileSource>>, timeout: Duration) -> Self {
        Self { remote, timeout }
    }

    pub fn local_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    /// Never fails: a missing, failing or slow remote source falls back to
    /// the local heuristics.
    pub async fn extract(&self, resume_text: &str) -> (CandidateProfile, ExtractionSource) {
        if let Some(remote) = &self.remote {
            match tokio::time::timeout(self.timeout, remote.extract(resume_text)).await {
                Ok(Ok(profile)) => {
                    info!("Resume fields extracted remotely");
                    return (profile, ExtractionSource::Ai);
                }
                Ok(Err(e)) => warn!("Remote resume extraction failed: {e}; using local"),
                Err(_) => warn!(
                    "Remote resume extraction timed out after {:?}; using local",
                    self.timeout
                ),
            }
        }
        (LocalProfileSource::profile(resume_text), ExtractionSource::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Asha Rao\n\
        asha.rao@example.com | +91 98765 43210\n\
        https://github.com/asharao  https://www.linkedin.com/in/asharao\n\
        Northfield Institute of Technology\n\
        5+ years building React and Node.js services with Docker and SQL.\n";

    struct FailingSource;

    #[async_trait]
    impl ProfileSource for FailingSource {
        async fn extract(&self, _: &str) -> Result<CandidateProfile, ProfileSourceError> {
            Err(ProfileSourceError::Empty)
        }
    }

    struct SlowSource;

    #[async_trait]
    impl ProfileSource for SlowSource {
        async fn extract(&self, text: &str) -> Result<CandidateProfile, ProfileSourceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(LocalProfileSource::profile(text))
        }
    }

    #[test]
    fn test_local_heuristics() {
        let profile = LocalProfileSource::profile(RESUME);
        let personal = &profile.personal;
        assert_eq!(personal.full_name, "Asha Rao");
        assert_eq!(personal.email, "asha.rao@example.com");
        assert_eq!(personal.phone, "+91 98765 43210");
        assert_eq!(personal.github_link, "https://github.com/asharao");
        assert_eq!(personal.linkedin_link, "https://www.linkedin.com/in/asharao");
        assert_eq!(personal.college, "Northfield Institute of Technology");
        assert_eq!(profile.public.experience_years, 5);
        assert_eq!(profile.public.skills, vec!["react", "node", "sql", "docker"]);
    }

    #[test]
    fn test_first_line_that_is_not_a_name_is_ignored() {
        let profile = LocalProfileSource::profile("Curriculum Vitae 2024\nBuilt things");
        assert_eq!(profile.personal.full_name, "");
    }

    #[test]
    fn test_skill_matching_uses_whole_words() {
        let profile = LocalProfileSource::profile("Senior javascript developer");
        assert_eq!(profile.public.skills, vec!["javascript"]);
    }

    #[test]
    fn test_short_digit_runs_are_not_phones() {
        assert_eq!(normalize_phone("12345 6789"), "");
        assert_eq!(normalize_phone("+1 (555) 010-9999"), "+1 (555) 010-9999");
    }

    #[tokio::test]
    async fn test_plain_text_upload_is_read() {
        let text = resume_text(RESUME.as_bytes(), Some("cv.txt"), None).await.unwrap();
        assert!(text.contains("Asha Rao"));
    }

    #[tokio::test]
    async fn test_unsupported_or_empty_upload_is_rejected() {
        let err = resume_text(b"PK\x03\x04", Some("cv.docx"), None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = resume_text(b"   \n", Some("cv.txt"), Some("text/plain")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_a_validation_error() {
        let err = resume_text(b"%PDF-1.4 not really a pdf", Some("cv.pdf"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_parser_panic_becomes_validation_error() {
        let err = parse_off_runtime(|| panic!("bad font table")).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("No readable text")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_tidy_drops_empty_entries() {
        let mut raw = CandidateProfile::default();
        raw.personal.full_name = "  Asha ".to_string();
        raw.public.projects = vec![Project::default()];
        raw.public.skills = vec!["Rust".to_string(), "rust".to_string()];
        let profile = tidy(raw);
        assert_eq!(profile.personal.full_name, "Asha");
        assert!(profile.public.projects.is_empty());
        assert_eq!(profile.public.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_failing_remote_falls_back_to_local() {
        let extractor = ResumeExtractor::new(Some(Arc::new(FailingSource)), Duration::from_secs(5));
        let (profile, source) = extractor.extract(RESUME).await;
        assert_eq!(source, ExtractionSource::Local);
        assert_eq!(profile.personal.full_name, "Asha Rao");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_remote_falls_back_to_local() {
        let extractor = ResumeExtractor::new(Some(Arc::new(SlowSource)), Duration::from_secs(20));
        let (_, source) = extractor.extract(RESUME).await;
        assert_eq!(source, ExtractionSource::Local);
    }

    #[tokio::test]
    async fn test_remote_result_is_tagged_ai() {
        let extractor =
            ResumeExtractor::new(Some(Arc::new(LocalProfileSource)), Duration::from_secs(5));
        let (_, source) = extractor.extract(RESUME).await;
        assert_eq!(source, ExtractionSource::Ai);
    }
}
