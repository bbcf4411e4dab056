use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assessment::RoundState;
use crate::models::profile::{
    Education, Experience, PersonalDetails, Project, PublicProfile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// Public-safe snapshot of the candidate taken when the application is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayProfile {
    pub skills: Vec<String>,
    pub experience_years: i32,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub portfolio_link: String,
    pub city: String,
    pub tagline: String,
    pub resume_anonymized_text: String,
}

impl From<&PublicProfile> for DisplayProfile {
    fn from(public: &PublicProfile) -> Self {
        DisplayProfile {
            skills: public.skills.clone(),
            experience_years: public.experience_years,
            projects: public.projects.clone(),
            education: public.education.clone(),
            experience: public.experience.clone(),
            portfolio_link: public.portfolio_link.clone(),
            city: public.city.clone(),
            tagline: public.tagline.clone(),
            resume_anonymized_text: public
                .resume_anonymized
                .as_ref()
                .map(|r| r.text.clone())
                .unwrap_or_default(),
        }
    }
}

/// Identity snapshot released only by the reveal gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub college: String,
    pub address: String,
    pub bio: String,
    pub github_link: String,
    pub linkedin_link: String,
}

impl From<&PersonalDetails> for PrivateProfile {
    fn from(personal: &PersonalDetails) -> Self {
        PrivateProfile {
            full_name: personal.full_name.clone(),
            email: personal.email.clone(),
            phone: personal.phone.clone(),
            gender: personal.gender.clone(),
            college: personal.college.clone(),
            address: personal.address.clone(),
            bio: personal.bio.clone(),
            github_link: personal.github_link.clone(),
            linkedin_link: personal.linkedin_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewInvite {
    pub sent_at: DateTime<Utc>,
    pub message: String,
}

/// Not `Serialize`: responses go through the view types in `pipeline` and
/// `review`, so `private_profile` and work-test answers stay server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub recruiter_id: Uuid,
    pub candidate_id: Uuid,
    pub anonymous_id: String,
    pub match_score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub status: ApplicationStatus,
    pub display_profile: DisplayProfile,
    pub private_profile: PrivateProfile,
    pub interview_invite: Option<InterviewInvite>,
    pub work_test: Option<RoundState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn invite_sent(&self) -> bool {
        self.interview_invite.is_some()
    }
}
