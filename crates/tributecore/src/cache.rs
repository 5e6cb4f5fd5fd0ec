//! Optional Redis connection
//!
//! Used for the health probe and for de-duplicating Telegram webhook
//! deliveries. The service runs without it; callers hold an
//! `Option<RedisCache>`.

use redis::aio::MultiplexedConnection;
use secrecy::{ExposeSecret, SecretString};

use crate::error::AppResult;

/// How long a processed update id is remembered. Telegram stops redelivering
/// well before that.
pub const UPDATE_DEDUP_TTL_SECS: u64 = 24 * 60 * 60;

const UPDATE_KEY_PREFIX: &str = "tribute:update:";

#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &SecretString) -> AppResult<Self> {
        let client = redis::Client::open(url.expose_secret())?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Redis connected");
        Ok(Self { conn })
    }

    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        let reply: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Redis ping failed");
                false
            }
        }
    }

    /// Marks `update_id` as processed.
    ///
    /// Returns `true` the first time an id is claimed and `false` for every
    /// later delivery within [`UPDATE_DEDUP_TTL_SECS`].
    pub async fn claim_update(&self, update_id: i64) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(update_key(update_id))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(UPDATE_DEDUP_TTL_SECS)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

fn update_key(update_id: i64) -> String {
    format!("{UPDATE_KEY_PREFIX}{update_id}")
}
