use crate::llm_client::prompts::NEUTRALITY_INSTRUCTION;

pub fn question_prompt(job_title: &str, required_skills: &[String], count: usize) -> String {
    let title = if job_title.trim().is_empty() {
        "this role"
    } else {
        job_title.trim()
    };
    format!(
        r#"Create exactly {count} multiple-choice screening questions for a job candidate.

Return ONLY valid JSON in this shape:
{{
  "questions": [
    {{
      "question_id": "q1",
      "question": "text",
      "options": ["a", "b", "c", "d"],
      "correct_answer": "one option copied exactly from options"
    }}
  ]
}}

Rules:
- Questions must check real skill fit for: {title}
- Use these required skills: {skills}
- Keep language simple.
- Each options array must have exactly 4 options.
- correct_answer must match one option exactly.
- {neutrality}"#,
        skills = required_skills.join(", "),
        neutrality = NEUTRALITY_INSTRUCTION,
    )
}
