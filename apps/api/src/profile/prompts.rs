/// Resume text beyond this many characters is not sent to the model.
pub const MAX_RESUME_CHARS: usize = 12_000;

pub fn extraction_prompt(resume_text: &str) -> String {
    let resume: String = resume_text.chars().take(MAX_RESUME_CHARS).collect();
    format!(
        r#"Extract candidate details from this resume text.

Return ONLY valid JSON with this exact shape:
{{
  "personal": {{
    "full_name": "",
    "email": "",
    "phone": "",
    "gender": "",
    "college": "",
    "address": "",
    "bio": "",
    "github_link": "",
    "linkedin_link": "",
    "current_role": "",
    "current_company": ""
  }},
  "public": {{
    "skills": [],
    "experience_years": 0,
    "tagline": "",
    "projects": [{{ "title": "", "description": "", "link": "", "technologies": [] }}],
    "education": [{{ "school": "", "degree": "", "field_of_study": "", "start_year": null, "end_year": null }}],
    "experience": [{{ "company": "", "role": "", "location": "", "description": "", "start_date": "", "end_date": "", "is_current": false }}],
    "portfolio_link": "",
    "city": ""
  }}
}}

Rules:
- Keep unknown fields as an empty string, an empty list, or 0.
- skills must be an array of short strings.
- experience_years must be a whole number.
- Only include entries that really appear in the resume.

Resume:
{resume}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_is_truncated() {
        let long = "x".repeat(MAX_RESUME_CHARS + 500);
        let prompt = extraction_prompt(&long);
        assert!(prompt.ends_with(&"x".repeat(MAX_RESUME_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_RESUME_CHARS + 1)));
    }
}
