//! Repository traits
//!
//! The service layer only sees these traits; PostgreSQL implementations live
//! in [`super::postgres`], tests plug in in-memory ones.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Channel, Payment, Subscription, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn create(&self, user: &User) -> AppResult<()>;

    // Single-column writes: concurrent requests touching different flags of
    // the same user must not overwrite each other.
    async fn mark_onboarded(&self, id: i64) -> AppResult<()>;
    async fn set_verified(&self, id: i64) -> AppResult<()>;
    async fn set_card_number(&self, id: i64, masked: &str) -> AppResult<()>;
    async fn mark_sub_published(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Channels of `user_id` in registration order.
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Channel>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Channel>>;
    /// Case-insensitive lookup across all accounts.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Channel>>;
    async fn create(&self, channel: &Channel) -> AppResult<()>;
    async fn update(&self, channel: &Channel) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Subscription>>;
    async fn find_by_channel_id(&self, channel_id: Uuid) -> AppResult<Option<Subscription>>;
    async fn create(&self, subscription: &Subscription) -> AppResult<()>;
    /// Updates title, description, button text and price.
    async fn update(&self, subscription: &Subscription) -> AppResult<()>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Payments of `user_id`, newest first.
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Payment>>;

    /// Stores `payment` and adds its amount to `creator_id`'s `earned` in one
    /// transaction. Fails with `RowNotFound` if the creator does not exist.
    async fn record_subscription(&self, payment: &Payment, creator_id: i64) -> AppResult<()>;
}
