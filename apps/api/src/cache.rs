//! Short-TTL read cache for job listings.
//!
//! The cache is an injected component rather than ambient state: the job
//! board reads through it and every job mutation calls `invalidate("jobs:")`.
//! Cache failures never fail a request; they are logged and treated as a miss.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;

pub const JOBS_PREFIX: &str = "jobs:";

pub fn job_list_key() -> String {
    format!("{JOBS_PREFIX}list")
}

pub fn job_detail_key(id: Uuid) -> String {
    format!("{JOBS_PREFIX}detail:{id}")
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: String, ttl: Duration);

    /// Drops every entry whose key starts with `prefix`.
    async fn invalidate(&self, prefix: &str);
}

// ────────────────────────────────────────────────────────────────────────────
// In-process cache
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        let now = Instant::now();
        let hit = entries
            .get(key)
            .filter(|(expires_at, _)| *expires_at > now)
            .map(|(_, value)| value.clone());
        if hit.is_none() {
            entries.remove(key);
        }
        hit
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (Instant::now() + ttl, value));
        }
    }

    async fn invalidate(&self, prefix: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis cache
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn try_invalidate(&self, prefix: &str) -> redis::RedisResult<usize> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let keys: Vec<String> = {
            let mut iter = conn.scan_match::<_, String>(format!("{prefix}*")).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };
        if !keys.is_empty() {
            conn.del::<_, ()>(&keys).await?;
        }
        Ok(keys.len())
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let result: redis::RedisResult<Option<String>> = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.get(key).await
        }
        .await;
        result.unwrap_or_else(|e| {
            warn!("Cache read for {key} failed: {e}");
            None
        })
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let result: redis::RedisResult<()> = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            conn.set_ex(key, value, ttl.as_secs().max(1)).await
        }
        .await;
        if let Err(e) = result {
            warn!("Cache write for {key} failed: {e}");
        }
    }

    async fn invalidate(&self, prefix: &str) {
        if let Err(e) = self.try_invalidate(prefix).await {
            warn!("Cache invalidation for prefix {prefix} failed: {e}");
        }
    }
}
