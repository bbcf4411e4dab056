mod anonymizer;
mod assessment;
mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod profile;
mod review;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::questions::LlmQuestionSource;
use crate::assessment::QuestionGenerator;
use crate::cache::{InMemoryCache, RedisCache, ResponseCache};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::profile::extraction::LlmProfileSource;
use crate::profile::ResumeExtractor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BlindHire API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set, using the in-process store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Job listing cache
    let cache: Arc<dyn ResponseCache> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis client initialized");
            Arc::new(RedisCache::new(client))
        }
        None => Arc::new(InMemoryCache::new()),
    };

    if config.anonymous_id_secret.is_none() {
        warn!("ANONYMOUS_ID_SECRET not set, candidate ids use the development secret");
    }

    let (questions, extractor) = build_generators(&config)?;

    let state = AppState::build(&config, store, cache, questions, extractor);
    info!("Pipeline variant: {}", config.pipeline_variant);

    let app = build_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        let status = res.status();
                        let latency_ms = latency.as_millis();
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Remote question and resume sources when an API key is configured, local
/// heuristics otherwise. Both fall back to local on timeout or failure.
fn build_generators(config: &Config) -> Result<(QuestionGenerator, ResumeExtractor)> {
    let Some(key) = config.anthropic_api_key.clone() else {
        warn!("ANTHROPIC_API_KEY not set, tests and resume parsing use local fallbacks");
        return Ok((QuestionGenerator::local_only(), ResumeExtractor::local_only()));
    };

    let llm = LlmClient::new(key, config.llm_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    Ok((
        QuestionGenerator::new(
            Some(Arc::new(LlmQuestionSource::new(llm.clone()))),
            config.llm_timeout,
        ),
        ResumeExtractor::new(Some(Arc::new(LlmProfileSource::new(llm))), config.llm_timeout),
    ))
}
