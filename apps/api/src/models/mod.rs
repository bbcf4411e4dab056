pub mod application;
pub mod assessment;
pub mod job;
pub mod profile;
