use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Subscription;
use crate::storage::repositories::SubscriptionRepository;

const SELECT_SUBSCRIPTION: &str = "SELECT id, channel_id, user_id, channel_username, title, description, button_text, \
                                   price, created_date FROM subscriptions";

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            "{SELECT_SUBSCRIPTION} WHERE user_id = $1 ORDER BY created_date"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subscriptions)
    }

    async fn find_by_channel_id(&self, channel_id: Uuid) -> AppResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!("{SELECT_SUBSCRIPTION} WHERE channel_id = $1"))
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(subscription)
    }

    async fn create(&self, subscription: &Subscription) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO subscriptions \
             (id, channel_id, user_id, channel_username, title, description, button_text, price, created_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(subscription.id)
        .bind(subscription.channel_id)
        .bind(subscription.user_id)
        .bind(&subscription.channel_username)
        .bind(&subscription.title)
        .bind(&subscription.description)
        .bind(&subscription.button_text)
        .bind(subscription.price)
        .bind(subscription.created_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<()> {
        sqlx::query("UPDATE subscriptions SET title = $2, description = $3, button_text = $4, price = $5 WHERE id = $1")
            .bind(subscription.id)
            .bind(&subscription.title)
            .bind(&subscription.description)
            .bind(&subscription.button_text)
            .bind(subscription.price)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
