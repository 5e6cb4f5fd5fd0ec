//! Health probes and webhook de-duplication over PostgreSQL and Redis

use async_trait::async_trait;
use sqlx::PgPool;

use tributecore::cache::RedisCache;
use tributecore::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Ok,
    Down,
    Disabled,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Ok => "ok",
            CacheStatus::Down => "down",
            CacheStatus::Disabled => "disabled",
        }
    }
}

#[async_trait]
pub trait Infrastructure: Send + Sync {
    async fn database_ok(&self) -> bool;

    async fn cache_status(&self) -> CacheStatus;

    /// `false` if this Telegram update was already processed.
    ///
    /// Without a working cache every update counts as new.
    async fn claim_update(&self, update_id: i64) -> bool;
}

pub struct ServerInfrastructure {
    pool: PgPool,
    cache: Option<RedisCache>,
}

impl ServerInfrastructure {
    pub fn new(pool: PgPool, cache: Option<RedisCache>) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl Infrastructure for ServerInfrastructure {
    async fn database_ok(&self) -> bool {
        storage::ping(&self.pool).await
    }

    async fn cache_status(&self) -> CacheStatus {
        match &self.cache {
            None => CacheStatus::Disabled,
            Some(cache) if cache.ping().await => CacheStatus::Ok,
            Some(_) => CacheStatus::Down,
        }
    }

    async fn claim_update(&self, update_id: i64) -> bool {
        let Some(cache) = &self.cache else {
            return true;
        };
        match cache.claim_update(update_id).await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(update_id, error = %e, "Update de-duplication unavailable");
                true
            }
        }
    }
}
