//! Qualification quizzes: question sourcing, grading, and the per-candidate
//! eligibility, company and work-test rounds built on them.

pub mod grading;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod service;

pub use questions::QuestionGenerator;
pub use service::QualificationService;
