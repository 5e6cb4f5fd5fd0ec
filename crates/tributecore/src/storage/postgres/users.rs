use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::User;
use crate::storage::repositories::UserRepository;

const SELECT_USER: &str =
    "SELECT user_id AS id, earned, is_verified, is_sub_published, is_onboarded, card_number FROM users";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn execute(&self, sql: &str, id: i64) -> AppResult<()> {
        sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE user_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (user_id, earned, is_verified, is_sub_published, is_onboarded, card_number) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(user.earned)
        .bind(user.is_verified)
        .bind(user.is_sub_published)
        .bind(user.is_onboarded)
        .bind(user.card_number.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_onboarded(&self, id: i64) -> AppResult<()> {
        self.execute("UPDATE users SET is_onboarded = TRUE WHERE user_id = $1", id).await
    }

    async fn set_verified(&self, id: i64) -> AppResult<()> {
        self.execute("UPDATE users SET is_verified = TRUE WHERE user_id = $1", id).await
    }

    async fn set_card_number(&self, id: i64, masked: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET card_number = $2 WHERE user_id = $1")
            .bind(id)
            .bind(masked)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_sub_published(&self, id: i64) -> AppResult<()> {
        self.execute("UPDATE users SET is_sub_published = TRUE WHERE user_id = $1", id).await
    }
}
