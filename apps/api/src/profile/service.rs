use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::anonymizer::build_preview;
use crate::errors::AppError;
use crate::models::profile::{
    clean_skills, AnonymizedResume, CandidateProfile, CandidateRecord, PersonalDetails,
    PublicProfile,
};
use crate::profile::extraction::{resume_text, ExtractionSource, ResumeExtractor};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub candidate_id: Uuid,
    pub anonymous_id: Option<String>,
    pub personal: PersonalDetails,
    pub public: PublicProfile,
}

impl From<CandidateRecord> for ProfileView {
    fn from(record: CandidateRecord) -> Self {
        ProfileView {
            candidate_id: record.id,
            anonymous_id: record.public_id,
            personal: record.profile.personal,
            public: record.profile.public,
        }
    }
}

/// Section-wise update: a section present in the body replaces the stored one.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub personal: Option<PersonalDetails>,
    pub public: Option<PublicProfile>,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResult {
    pub message: String,
    pub source: ExtractionSource,
    pub updated_fields: Vec<&'static str>,
    pub profile: ProfileView,
}

pub struct ProfileService {
    store: Arc<dyn Store>,
    extractor: Arc<ResumeExtractor>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, extractor: Arc<ResumeExtractor>) -> Self {
        Self { store, extractor }
    }

    async fn load(&self, candidate_id: Uuid) -> Result<CandidateRecord, AppError> {
        Ok(self
            .store
            .get_candidate(candidate_id)
            .await?
            .unwrap_or_else(|| CandidateRecord::empty(candidate_id)))
    }

    pub async fn get(&self, candidate_id: Uuid) -> Result<ProfileView, AppError> {
        Ok(self.load(candidate_id).await?.into())
    }

    pub async fn update(
        &self,
        candidate_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<ProfileView, AppError> {
        let current = self.load(candidate_id).await?.profile;
        let mut next = current.clone();

        if let Some(mut personal) = req.personal {
            // Resume text only changes through an upload.
            personal.resume_text = current.personal.resume_text.clone();
            next.personal = personal;
        }
        if let Some(mut public) = req.public {
            if public.experience_years < 0 {
                return Err(AppError::Validation(
                    "experience_years must not be negative".to_string(),
                ));
            }
            public.skills = clean_skills(&public.skills);
            public.resume_anonymized = current.public.resume_anonymized.clone();
            next.public = public;
        }
        refresh_preview(&mut next);

        let record = self.store.save_profile(candidate_id, &next).await?;
        Ok(record.into())
    }

    /// Reads the upload, extracts fields, merges them into the stored
    /// profile and rebuilds the anonymized preview.
    pub async fn upload_resume(
        &self,
        candidate_id: Uuid,
        bytes: &[u8],
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<ResumeUploadResult, AppError> {
        let text = resume_text(bytes, file_name, content_type).await?;
        let current = self.load(candidate_id).await?.profile;
        let (record, source, updated_fields) = self.fill_from(candidate_id, &current, &text).await?;

        let message = if updated_fields.is_empty() {
            "Resume uploaded and saved. You can edit fields manually."
        } else {
            "Resume uploaded, profile auto-filled, and saved"
        };
        Ok(ResumeUploadResult {
            message: message.to_string(),
            source,
            updated_fields,
            profile: record.into(),
        })
    }

    /// Re-runs extraction over the stored resume text, e.g. after manual
    /// edits cleared fields the resume still covers.
    pub async fn auto_fill(&self, candidate_id: Uuid) -> Result<ResumeUploadResult, AppError> {
        let current = self.load(candidate_id).await?.profile;
        let text = current.personal.resume_text.clone();
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "No uploaded resume found. Please upload a resume first.".to_string(),
            ));
        }
        let (record, source, updated_fields) = self.fill_from(candidate_id, &current, &text).await?;

        let message = if updated_fields.is_empty() {
            "Profile already matches the uploaded resume"
        } else {
            "Profile auto-filled from the uploaded resume"
        };
        Ok(ResumeUploadResult {
            message: message.to_string(),
            source,
            updated_fields,
            profile: record.into(),
        })
    }

    async fn fill_from(
        &self,
        candidate_id: Uuid,
        current: &CandidateProfile,
        text: &str,
    ) -> Result<(CandidateRecord, ExtractionSource, Vec<&'static str>), AppError> {
        let (extracted, source) = self.extractor.extract(text).await;
        let mut next = merge_extracted(current, extracted, text);
        refresh_preview(&mut next);
        let updated_fields = changed_fields(current, &next);

        let record = self.store.save_profile(candidate_id, &next).await?;
        info!(
            "Resume processed for candidate {candidate_id} ({} fields updated)",
            updated_fields.len()
        );
        Ok((record, source, updated_fields))
    }
}

fn refresh_preview(profile: &mut CandidateProfile) {
    if profile.personal.resume_text.trim().is_empty() {
        return;
    }
    let text = build_preview(
        &profile.personal.resume_text,
        &profile.personal,
        &profile.public,
    );
    profile.public.resume_anonymized = Some(AnonymizedResume {
        text,
        updated_at: Utc::now(),
    });
}

fn prefer(extracted: String, existing: &str) -> String {
    if extracted.trim().is_empty() {
        existing.to_string()
    } else {
        extracted
    }
}

/// Keeps the first item per key; items with an empty key are dropped.
fn merge_by_key<T: Clone>(existing: &[T], extracted: Vec<T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .cloned()
        .chain(extracted)
        .filter(|item| {
            let k = key(item);
            k != "|" && seen.insert(k)
        })
        .collect()
}

fn pair(a: &str, b: &str) -> String {
    format!("{}|{}", a.trim().to_lowercase(), b.trim().to_lowercase())
}

/// Extracted personal values win when non-empty; list sections are unioned.
pub fn merge_extracted(
    current: &CandidateProfile,
    extracted: CandidateProfile,
    resume_text: &str,
) -> CandidateProfile {
    let old = &current.personal;
    let new = extracted.personal;
    let personal = PersonalDetails {
        full_name: prefer(new.full_name, &old.full_name),
        email: prefer(new.email, &old.email),
        phone: prefer(new.phone, &old.phone),
        gender: prefer(new.gender, &old.gender),
        college: prefer(new.college, &old.college),
        address: prefer(new.address, &old.address),
        bio: prefer(new.bio, &old.bio),
        github_link: prefer(new.github_link, &old.github_link),
        linkedin_link: prefer(new.linkedin_link, &old.linkedin_link),
        current_role: prefer(new.current_role, &old.current_role),
        current_company: prefer(new.current_company, &old.current_company),
        resume_text: resume_text.to_string(),
    };

    let old = &current.public;
    let new = extracted.public;
    let public = PublicProfile {
        skills: clean_skills(old.skills.iter().chain(new.skills.iter())),
        experience_years: if new.experience_years > 0 {
            new.experience_years
        } else {
            old.experience_years
        },
        tagline: prefer(new.tagline, &old.tagline),
        projects: merge_by_key(&old.projects, new.projects, |p| pair(&p.title, &p.link)),
        education: merge_by_key(&old.education, new.education, |e| pair(&e.school, &e.degree)),
        experience: merge_by_key(&old.experience, new.experience, |x| pair(&x.company, &x.role)),
        portfolio_link: prefer(new.portfolio_link, &old.portfolio_link),
        city: prefer(new.city, &old.city),
        resume_anonymized: old.resume_anonymized.clone(),
    };

    CandidateProfile { personal, public }
}

/// Names of the profile fields an upload changed.
pub fn changed_fields(before: &CandidateProfile, after: &CandidateProfile) -> Vec<&'static str> {
    let (bp, ap) = (&before.personal, &after.personal);
    let (bq, aq) = (&before.public, &after.public);
    let differs = |a: &str, b: &str| a.trim() != b.trim();

    let checks = [
        ("full_name", differs(&bp.full_name, &ap.full_name)),
        ("email", differs(&bp.email, &ap.email)),
        ("phone", differs(&bp.phone, &ap.phone)),
        ("gender", differs(&bp.gender, &ap.gender)),
        ("college", differs(&bp.college, &ap.college)),
        ("address", differs(&bp.address, &ap.address)),
        ("bio", differs(&bp.bio, &ap.bio)),
        ("github_link", differs(&bp.github_link, &ap.github_link)),
        ("linkedin_link", differs(&bp.linkedin_link, &ap.linkedin_link)),
        ("current_role", differs(&bp.current_role, &ap.current_role)),
        ("current_company", differs(&bp.current_company, &ap.current_company)),
        ("skills", aq.skills.len() > bq.skills.len()),
        ("experience_years", aq.experience_years != bq.experience_years),
        ("tagline", differs(&bq.tagline, &aq.tagline)),
        ("projects", aq.projects.len() > bq.projects.len()),
        ("education", aq.education.len() > bq.education.len()),
        ("experience", aq.experience.len() > bq.experience.len()),
        ("portfolio_link", differs(&bq.portfolio_link, &aq.portfolio_link)),
        ("city", differs(&bq.city, &aq.city)),
    ];
    checks
        .into_iter()
        .filter_map(|(name, changed)| changed.then_some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::profile::{Education, Project};
    use crate::store::MemoryStore;
    use crate::test_support::{profile, seed_profile};

    const RESUME: &str = "Asha Rao\n\
        asha@example.com\n\
        Northfield Institute\n\
        Backend engineer with 4 years of experience shipping python and docker services \
        for payments, search and logistics teams across several product launches.\n";

    fn service() -> (Arc<MemoryStore>, ProfileService) {
        let store = Arc::new(MemoryStore::new());
        let service = ProfileService::new(store.clone(), Arc::new(ResumeExtractor::local_only()));
        (store, service)
    }

    #[tokio::test]
    async fn test_unknown_candidate_gets_empty_profile() {
        let (_, service) = service();
        let id = Uuid::new_v4();
        let view = service.get(id).await.unwrap();
        assert_eq!(view.candidate_id, id);
        assert!(view.public.skills.is_empty());
        assert!(view.anonymous_id.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_only_given_section() {
        let (store, service) = service();
        let id = Uuid::new_v4();
        seed_profile(store.as_ref(), id, &["react"]).await;

        let public = PublicProfile {
            skills: vec!["Go".to_string(), " go ".to_string(), "sql".to_string()],
            city: "Delhi".to_string(),
            ..Default::default()
        };
        let view = service
            .update(
                id,
                UpdateProfileRequest {
                    personal: None,
                    public: Some(public),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.personal.full_name, "Asha Rao");
        assert_eq!(view.public.skills, vec!["Go", "sql"]);
        assert_eq!(view.public.city, "Delhi");
    }

    #[tokio::test]
    async fn test_negative_experience_is_rejected() {
        let (_, service) = service();
        let req = UpdateProfileRequest {
            personal: None,
            public: Some(PublicProfile {
                experience_years: -1,
                ..Default::default()
            }),
        };
        let err = service.update(Uuid::new_v4(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_fills_profile_and_builds_redacted_preview() {
        let (_, service) = service();
        let id = Uuid::new_v4();

        let result = service
            .upload_resume(id, RESUME.as_bytes(), Some("resume.txt"), Some("text/plain"))
            .await
            .unwrap();

        assert_eq!(result.source, ExtractionSource::Local);
        assert!(result.updated_fields.contains(&"full_name"));
        assert!(result.updated_fields.contains(&"skills"));
        assert_eq!(result.profile.public.experience_years, 4);

        let preview = result.profile.public.resume_anonymized.unwrap().text;
        assert!(!preview.is_empty());
        assert!(!preview.contains("asha@example.com"));
        assert!(!preview.contains("Asha Rao"));
    }

    #[tokio::test]
    async fn test_auto_fill_needs_an_uploaded_resume() {
        let (store, service) = service();
        let id = Uuid::new_v4();
        seed_profile(store.as_ref(), id, &["react"]).await;
        let err = service.auto_fill(id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_auto_fill_restores_cleared_fields_from_stored_resume() {
        let (_, service) = service();
        let id = Uuid::new_v4();
        service
            .upload_resume(id, RESUME.as_bytes(), Some("resume.txt"), None)
            .await
            .unwrap();
        service
            .update(
                id,
                UpdateProfileRequest {
                    personal: None,
                    public: Some(PublicProfile::default()),
                },
            )
            .await
            .unwrap();

        let result = service.auto_fill(id).await.unwrap();
        assert!(result.updated_fields.contains(&"skills"));
        assert!(result.profile.public.skills.iter().any(|s| s == "python"));
        assert_eq!(result.profile.public.experience_years, 4);
        assert_eq!(result.profile.personal.resume_text, RESUME);

        let again = service.auto_fill(id).await.unwrap();
        assert!(again.updated_fields.is_empty());
    }

    #[tokio::test]
    async fn test_personal_update_keeps_resume_and_rebuilds_preview() {
        let (_, service) = service();
        let id = Uuid::new_v4();
        service
            .upload_resume(id, RESUME.as_bytes(), Some("resume.txt"), None)
            .await
            .unwrap();

        let personal = PersonalDetails {
            full_name: "Asha R".to_string(),
            resume_text: "client supplied".to_string(),
            ..Default::default()
        };
        let view = service
            .update(
                id,
                UpdateProfileRequest {
                    personal: Some(personal),
                    public: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(view.personal.resume_text, RESUME);
        assert!(view.public.resume_anonymized.is_some());
    }

    #[test]
    fn test_merge_unions_lists_and_prefers_extracted_values() {
        let mut current = profile(&["React"]);
        current.public.projects = vec![Project {
            title: "Ledger".to_string(),
            link: "https://x.dev/ledger".to_string(),
            ..Default::default()
        }];

        let mut extracted = CandidateProfile::default();
        extracted.personal.email = "new@example.com".to_string();
        extracted.public.skills = vec!["react".to_string(), "docker".to_string()];
        extracted.public.projects = vec![
            Project {
                title: "LEDGER".to_string(),
                link: "https://x.dev/ledger".to_string(),
                description: "dup".to_string(),
                ..Default::default()
            },
            Project {
                title: "Search".to_string(),
                ..Default::default()
            },
        ];
        extracted.public.education = vec![Education::default()];

        let merged = merge_extracted(&current, extracted, "text");
        assert_eq!(merged.personal.email, "new@example.com");
        assert_eq!(merged.personal.full_name, "Asha Rao");
        assert_eq!(merged.public.skills, vec!["React", "docker"]);
        assert_eq!(merged.public.projects.len(), 2);
        assert_eq!(merged.public.projects[0].description, "");
        assert!(merged.public.education.is_empty());
        assert_eq!(merged.public.experience_years, 3);

        let fields = changed_fields(&current, &merged);
        assert_eq!(fields, vec!["email", "skills", "projects"]);
    }
}
