use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::pipeline::PipelineVariant;

/// Application configuration loaded from environment variables.
///
/// Only the listening port is strictly validated; every collaborator is
/// optional and degrades to its in-process counterpart when unset.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. `None` runs on the in-process store (development only).
    pub database_url: Option<String>,
    /// Redis URL for the job-listing cache. `None` uses the in-process cache.
    pub redis_url: Option<String>,
    /// Enables the remote question source and resume extraction.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub eligibility_pass_score: i32,
    pub llm_timeout: Duration,
    pub job_cache_ttl: Duration,
    pub pipeline_variant: PipelineVariant,
    /// Keys recruiter-facing candidate ids. `None` uses a development secret.
    pub anonymous_id_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let eligibility_pass_score = parse_env("ELIGIBILITY_PASS_SCORE", 60_i32)?;
        if !(0..=100).contains(&eligibility_pass_score) {
            return Err(anyhow!("ELIGIBILITY_PASS_SCORE must be between 0 and 100"));
        }

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080_u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            eligibility_pass_score,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 20_u64)?),
            job_cache_ttl: Duration::from_secs(parse_env("JOB_CACHE_TTL_SECS", 30_u64)?),
            pipeline_variant: parse_env("PIPELINE_VARIANT", PipelineVariant::DualTest)?,
            anonymous_id_secret: optional_env("ANONYMOUS_ID_SECRET"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            redis_url: None,
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            eligibility_pass_score: 60,
            llm_timeout: Duration::from_secs(20),
            job_cache_ttl: Duration::from_secs(30),
            pipeline_variant: PipelineVariant::DualTest,
            anonymous_id_secret: None,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
    }
}
