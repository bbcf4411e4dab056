use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity-bearing half of a candidate profile. Never rendered to a
/// recruiter except through the reveal gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub college: String,
    pub address: String,
    pub bio: String,
    pub github_link: String,
    pub linkedin_link: String,
    pub current_role: String,
    pub current_company: String,
    pub resume_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub link: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub location: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizedResume {
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

/// Public-safe half of a candidate profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicProfile {
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub tagline: String,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub portfolio_link: String,
    pub city: String,
    pub resume_anonymized: Option<AnonymizedResume>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub personal: PersonalDetails,
    pub public: PublicProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub id: Uuid,
    /// Anonymous id shown to recruiters; assigned once, on first application.
    pub public_id: Option<String>,
    pub profile: CandidateProfile,
    pub updated_at: DateTime<Utc>,
}

impl CandidateRecord {
    pub fn empty(id: Uuid) -> Self {
        CandidateRecord {
            id,
            public_id: None,
            profile: CandidateProfile::default(),
            updated_at: Utc::now(),
        }
    }
}

/// Trims, drops blanks and de-duplicates case-insensitively, keeping the
/// first spelling seen.
pub fn clean_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}
