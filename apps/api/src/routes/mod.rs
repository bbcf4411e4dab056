pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::jobs::handlers as jobs;
use crate::pipeline::handlers as pipeline;
use crate::profile::handlers as profile;
use crate::review::handlers as review;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Job board
        .route("/jobs", post(jobs::handle_create_job).get(jobs::handle_list_jobs))
        .route("/jobs/mine", get(jobs::handle_my_jobs))
        .route("/jobs/:id", get(jobs::handle_get_job))
        .route("/jobs/:id/apply", post(pipeline::handle_apply))
        // Qualification rounds
        .route(
            "/eligibility/:job_id/start",
            post(assessment::handle_start_eligibility),
        )
        .route("/eligibility/:job_id", get(assessment::handle_eligibility_status))
        .route(
            "/eligibility/:job_id/submit",
            post(assessment::handle_submit_eligibility),
        )
        .route("/company-test/:job_id", get(assessment::handle_open_company_test))
        .route(
            "/company-test/:job_id/submit",
            post(assessment::handle_submit_company_test),
        )
        // Candidate
        .route(
            "/candidate/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route(
            "/candidate/profile/resume",
            post(profile::handle_upload_resume)
                .layer(DefaultBodyLimit::max(profile::MAX_RESUME_BYTES)),
        )
        .route(
            "/candidate/profile/auto-fill",
            post(profile::handle_auto_fill_profile),
        )
        .route("/candidate/jobs/suitable", get(jobs::handle_suitable_jobs))
        .route(
            "/candidate/applications",
            get(pipeline::handle_candidate_applications),
        )
        .route(
            "/candidate/applications/:id/work-test",
            get(assessment::handle_get_work_test),
        )
        .route(
            "/candidate/applications/:id/work-test/submit",
            post(assessment::handle_submit_work_test),
        )
        // Recruiter
        .route(
            "/recruiter/jobs/test/generate",
            post(jobs::handle_generate_recruiter_test),
        )
        .route(
            "/recruiter/jobs/:job_id/applications",
            get(review::handle_list_applications),
        )
        .route("/recruiter/jobs/:job_id/test", put(jobs::handle_set_recruiter_test))
        .route("/recruiter/jobs/:job_id/expire", put(jobs::handle_expire_job))
        .route(
            "/recruiter/applications/:id/shortlist",
            put(review::handle_shortlist),
        )
        .route("/recruiter/applications/:id/reveal", get(review::handle_reveal))
        .route(
            "/recruiter/applications/:id/status",
            put(review::handle_override_status),
        )
        .route(
            "/recruiter/applications/:id/work-test",
            post(review::handle_assign_work_test),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
}
