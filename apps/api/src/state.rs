use std::sync::Arc;

use crate::assessment::{QualificationService, QuestionGenerator};
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::jobs::JobBoard;
use crate::pipeline::{AnonymousIds, ApplicationPipeline};
use crate::profile::{ProfileService, ResumeExtractor};
use crate::review::RecruiterReview;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ApplicationPipeline>,
    pub qualification: Arc<QualificationService>,
    pub review: Arc<RecruiterReview>,
    pub jobs: Arc<JobBoard>,
    pub profiles: Arc<ProfileService>,
}

impl AppState {
    /// Wires every service over one store. The question generator is shared
    /// by eligibility rounds, work tests and recruiter drafts.
    pub fn build(
        config: &Config,
        store: Arc<dyn Store>,
        cache: Arc<dyn ResponseCache>,
        questions: QuestionGenerator,
        extractor: ResumeExtractor,
    ) -> Self {
        let questions = Arc::new(questions);
        let ids = config
            .anonymous_id_secret
            .as_deref()
            .map(AnonymousIds::new)
            .unwrap_or_default();
        let pipeline = Arc::new(
            ApplicationPipeline::new(store.clone(), config.pipeline_variant)
                .with_anonymous_ids(ids),
        );

        AppState {
            qualification: Arc::new(QualificationService::new(
                store.clone(),
                questions.clone(),
                config.eligibility_pass_score,
                pipeline.clone(),
            )),
            review: Arc::new(RecruiterReview::new(
                store.clone(),
                questions.clone(),
                config.pipeline_variant,
                config.eligibility_pass_score,
            )),
            jobs: Arc::new(JobBoard::new(
                store.clone(),
                cache,
                questions,
                config.job_cache_ttl,
            )),
            profiles: Arc::new(ProfileService::new(store, Arc::new(extractor))),
            pipeline,
        }
    }
}
