//! Skill-overlap scoring between a job's requirements and a candidate.
//!
//! Comparison is case-insensitive exact match after trimming. No stemming,
//! synonyms or fuzzy matching: "node" and "nodejs" are different skills.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::job::Job;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillMatch {
    /// 0 – 100
    pub score: i32,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Lowercased key → display spelling. When two spellings collide the
/// lexicographically smallest wins, so the result does not depend on order.
fn normalise<S: AsRef<str>>(skills: &[S]) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for skill in skills {
        let trimmed = skill.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        out.entry(trimmed.to_lowercase())
            .and_modify(|existing| {
                if trimmed < existing.as_str() {
                    *existing = trimmed.to_string();
                }
            })
            .or_insert_with(|| trimmed.to_string());
    }
    out
}

/// `round(100 * part / total)` with halves rounded up; 0 when `total` is 0.
pub fn round_percent(part: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (part as u64, total as u64);
    ((200 * part + total) / (2 * total)) as i32
}

/// An empty requirement list scores 0, never 100.
pub fn score_skills<R, C>(required: &[R], candidate: &[C]) -> SkillMatch
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let required = normalise(required);
    if required.is_empty() {
        return SkillMatch::default();
    }
    let have: HashSet<String> = normalise(candidate).into_keys().collect();

    let (matched, missing): (Vec<_>, Vec<_>) = required
        .into_iter()
        .partition(|(key, _)| have.contains(key));

    let score = round_percent(matched.len(), matched.len() + missing.len());

    SkillMatch {
        score,
        matched: matched.into_iter().map(|(_, display)| display).collect(),
        missing: missing.into_iter().map(|(_, display)| display).collect(),
    }
}

/// Orders jobs for a candidate: best score first, then title.
pub fn rank_jobs<C: AsRef<str>>(jobs: Vec<Job>, candidate: &[C]) -> Vec<(Job, SkillMatch)> {
    let mut ranked: Vec<(Job, SkillMatch)> = jobs
        .into_iter()
        .map(|job| {
            let fit = score_skills(&job.required_skills, candidate);
            (job, fit)
        })
        .collect();
    ranked.sort_by(|(a_job, a_fit), (b_job, b_fit)| {
        b_fit
            .score
            .cmp(&a_fit.score)
            .then_with(|| a_job.title.to_lowercase().cmp(&b_job.title.to_lowercase()))
    });
    ranked
}
