//! Recruiter side of an application: ranked listing, shortlisting with an
//! interview invite, the identity reveal gate, and work-test assignment.

pub mod handlers;
pub mod service;

pub use service::RecruiterReview;
