use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Channel;
use crate::storage::repositories::ChannelRepository;

const SELECT_CHANNEL: &str = "SELECT id, user_id, channel_title, channel_username, is_verified FROM channels";

#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Channel>> {
        let channels = sqlx::query_as::<_, Channel>(&format!(
            "{SELECT_CHANNEL} WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(channels)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(&format!("{SELECT_CHANNEL} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(channel)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(&format!(
            "{SELECT_CHANNEL} WHERE lower(channel_username) = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(channel)
    }

    async fn create(&self, channel: &Channel) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO channels (id, user_id, channel_title, channel_username, is_verified) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(channel.id)
        .bind(channel.user_id)
        .bind(&channel.channel_title)
        .bind(&channel.channel_username)
        .bind(channel.is_verified)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, channel: &Channel) -> AppResult<()> {
        sqlx::query("UPDATE channels SET channel_title = $2, channel_username = $3, is_verified = $4 WHERE id = $1")
            .bind(channel.id)
            .bind(&channel.channel_title)
            .bind(&channel.channel_username)
            .bind(channel.is_verified)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
