use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::matching::round_percent;
use crate::models::assessment::{Question, RoundOutcome, SubmittedAnswer, TestStatus};

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Grades a submission against the stored answer key.
///
/// Answers are matched to questions by id and compared trimmed and
/// case-insensitively; unanswered questions count as wrong and answers to
/// unknown ids are ignored. The stored answers follow question order.
pub fn grade(
    questions: &[Question],
    submitted: &[SubmittedAnswer],
    pass_score: i32,
    now: DateTime<Utc>,
) -> RoundOutcome {
    let by_id: HashMap<&str, &str> = submitted
        .iter()
        .map(|a| (a.question_id.trim(), a.answer.as_str()))
        .collect();

    let mut correct = 0;
    let answers = questions
        .iter()
        .map(|q| {
            let answer = by_id
                .get(q.question_id.as_str())
                .map(|a| a.trim().to_string())
                .unwrap_or_default();
            if !answer.is_empty() && normalize(&answer) == normalize(&q.correct_answer) {
                correct += 1;
            }
            SubmittedAnswer {
                question_id: q.question_id.clone(),
                answer,
            }
        })
        .collect();

    let score = round_percent(correct, questions.len());
    let status = if score >= pass_score {
        TestStatus::Passed
    } else {
        TestStatus::Failed
    };

    RoundOutcome {
        score,
        status,
        answers,
        submitted_at: now,
    }
}
