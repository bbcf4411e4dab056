//! Candidate profile: section-wise edits and resume upload with field
//! extraction and the anonymized preview recruiters see.

pub mod extraction;
pub mod handlers;
pub mod prompts;
pub mod service;

pub use extraction::ResumeExtractor;
pub use service::ProfileService;
