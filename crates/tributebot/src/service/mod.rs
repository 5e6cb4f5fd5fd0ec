//! Business operations of the Tribute backend
//!
//! Handlers pass the authenticated Telegram user id in; everything the
//! service touches (repositories, Bot API, payout provider, clock) is behind a
//! trait object so tests can swap in in-memory versions.

mod validation;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use tributecore::auth::Clock;
use tributecore::models::{Channel, Payment, Subscription, User};
use tributecore::payouts::{mask_card_number, CardDetails, PayoutError, PayoutGateway};
use tributecore::storage::{
    ChannelRepository, PaymentRepository, PgChannelRepository, PgPaymentRepository, PgSubscriptionRepository,
    PgUserRepository, SubscriptionRepository, UserRepository,
};
use tributecore::AppError;

use crate::telegram::{BotError, BotGateway, CallbackParseError, VerificationAction, VerificationCallback};

pub use validation::normalize_channel_username;

const VERIFICATION_REJECTED_TEXT: &str = "Ваша верификация была отклонена.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error("user must be verified to set up payouts")]
    UserNotVerified,

    #[error("this channel is already added to your account")]
    ChannelAlreadyAdded,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("channel does not belong to this user")]
    ChannelNotOwned,

    #[error("{0}")]
    InvalidChannelUsername(String),

    #[error("{0} is not valid base64")]
    InvalidDocument(&'static str),

    #[error(transparent)]
    InvalidCallback(#[from] CallbackParseError),

    #[error("user has no channels to publish a subscription for")]
    NoChannels,

    #[error("creator has no channels")]
    CreatorHasNoChannels,

    #[error("creator has no subscription tier")]
    NoSubscriptionTier,

    #[error("price {offered} does not match the subscription price {expected}")]
    PriceMismatch { expected: f64, offered: f64 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Payout(#[from] PayoutError),

    #[error(transparent)]
    Storage(#[from] AppError),

    #[error(transparent)]
    Bot(#[from] BotError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Everything shown on a user's dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub user: User,
    pub channels: Vec<Channel>,
    pub subscriptions: Vec<Subscription>,
    pub payments: Vec<Payment>,
}

/// Repository handles used by [`TributeService`].
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub channels: Arc<dyn ChannelRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            channels: Arc::new(PgChannelRepository::new(pool.clone())),
            subscriptions: Arc::new(PgSubscriptionRepository::new(pool.clone())),
            payments: Arc::new(PgPaymentRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct TributeService {
    repos: Repositories,
    bot: Arc<dyn BotGateway>,
    payouts: Arc<dyn PayoutGateway>,
    clock: Arc<dyn Clock>,
}

impl TributeService {
    pub fn new(
        repos: Repositories,
        bot: Arc<dyn BotGateway>,
        payouts: Arc<dyn PayoutGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repos,
            bot,
            payouts,
            clock,
        }
    }

    async fn require_user(&self, user_id: i64) -> ServiceResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    /// Sends a message the operation does not depend on. Failures are logged.
    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.bot.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "Failed to send notification");
        }
    }

    pub async fn dashboard(&self, user_id: i64) -> ServiceResult<Dashboard> {
        let user = self.require_user(user_id).await?;
        let channels = self.repos.channels.find_by_user_id(user_id).await?;
        let subscriptions = self.repos.subscriptions.find_by_user_id(user_id).await?;
        let payments = self.repos.payments.find_by_user_id(user_id).await?;

        Ok(Dashboard {
            user,
            channels,
            subscriptions,
            payments,
        })
    }

    /// Creates the user on first contact. Returns the user and whether it was
    /// created by this call.
    pub async fn onboard(&self, user_id: i64) -> ServiceResult<(User, bool)> {
        match self.repos.users.find_by_id(user_id).await? {
            Some(user) if user.is_onboarded => Ok((user, false)),
            Some(mut user) => {
                self.repos.users.mark_onboarded(user_id).await?;
                user.is_onboarded = true;
                tracing::info!(user_id, "User marked as onboarded");
                Ok((user, false))
            }
            None => {
                let user = User::onboarded(user_id);
                self.repos.users.create(&user).await?;
                tracing::info!(user_id, "User created");
                Ok((user, true))
            }
        }
    }

    pub async fn create_user(&self, user_id: i64) -> ServiceResult<(Dashboard, bool)> {
        let (_, created) = self.onboard(user_id).await?;
        let dashboard = self.dashboard(user_id).await?;
        Ok((dashboard, created))
    }

    pub async fn add_channel(&self, user_id: i64, title: &str, username: &str) -> ServiceResult<Channel> {
        self.require_user(user_id).await?;

        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("channel_title must not be empty".to_string()));
        }
        let username = normalize_channel_username(username)?;

        if let Some(existing) = self.repos.channels.find_by_username(&username).await? {
            tracing::info!(user_id, owner_id = existing.user_id, channel = %username, "Channel already registered");
            return Err(ServiceError::ChannelAlreadyAdded);
        }

        let channel = Channel {
            id: Uuid::new_v4(),
            user_id,
            channel_title: title.to_string(),
            channel_username: username,
            is_verified: false,
        };
        match self.repos.channels.create(&channel).await {
            Ok(()) => {}
            // Registered concurrently
            Err(AppError::Database(e)) if is_unique_violation(&e) => return Err(ServiceError::ChannelAlreadyAdded),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id, channel_id = %channel.id, channel = %channel.channel_username, "Channel added");

        self.notify(
            user_id,
            &format!(
                "Just a moment, we are checking bot permissions in @{}",
                channel.channel_username
            ),
        )
        .await;

        Ok(channel)
    }

    pub async fn channels(&self, user_id: i64) -> ServiceResult<Vec<Channel>> {
        Ok(self.repos.channels.find_by_user_id(user_id).await?)
    }

    /// Confirms that `user_id` owns or administers the channel.
    ///
    /// On success the channel is marked verified. Otherwise it is deleted and
    /// `false` is returned.
    pub async fn check_channel(&self, user_id: i64, channel_id: Uuid) -> ServiceResult<bool> {
        let mut channel = self
            .repos
            .channels
            .find_by_id(channel_id)
            .await?
            .ok_or(ServiceError::ChannelNotFound)?;
        if channel.user_id != user_id {
            return Err(ServiceError::ChannelNotOwned);
        }

        let status = self.bot.member_status(&channel.channel_username, user_id).await?;
        if !status.can_manage() {
            self.repos.channels.delete(channel_id).await?;
            tracing::info!(user_id, %channel_id, ?status, "Channel removed, user is not an owner");
            return Ok(false);
        }

        channel.is_verified = true;
        self.repos.channels.update(&channel).await?;
        tracing::info!(user_id, %channel_id, ?status, "Channel verified");

        self.notify(
            user_id,
            &format!(
                "Good! You added bot to channel: {} (@{})",
                channel.channel_title, channel.channel_username
            ),
        )
        .await;

        Ok(true)
    }

    /// Forwards passport documents to the admin chat for manual review.
    pub async fn request_verification(&self, user_id: i64, photo_b64: &str, passport_b64: &str) -> ServiceResult<()> {
        self.require_user(user_id).await?;

        let photo = decode_document(photo_b64, "user-photo")?;
        let passport = decode_document(passport_b64, "user-passport")?;

        self.bot.send_verification_request(user_id, photo, passport).await?;
        tracing::info!(user_id, "Verification request sent to admins");
        Ok(())
    }

    /// Applies an admin's approve/reject button press.
    ///
    /// Removing the admin message is best effort: Telegram refuses to delete
    /// messages older than 48 hours.
    pub async fn handle_verification_callback(
        &self,
        chat_id: i64,
        message_id: i32,
        data: &str,
    ) -> ServiceResult<VerificationCallback> {
        let callback = VerificationCallback::parse(data)?;
        let user = self.require_user(callback.user_id).await?;

        match callback.action {
            VerificationAction::Approve => {
                self.repos.users.set_verified(user.id).await?;
                tracing::info!(user_id = user.id, "Passport verification approved");
            }
            VerificationAction::Reject => {
                tracing::info!(user_id = user.id, "Passport verification rejected");
                self.notify(user.id, VERIFICATION_REJECTED_TEXT).await;
            }
        }

        if let Err(e) = self.bot.delete_message(chat_id, message_id).await {
            tracing::warn!(chat_id, message_id, error = %e, "Failed to delete verification message");
        }
        Ok(callback)
    }

    /// Registers a payout card. Only the masked number is kept.
    pub async fn set_up_payouts(&self, user_id: i64, card: CardDetails) -> ServiceResult<User> {
        let mut user = self.require_user(user_id).await?;
        if !user.is_verified {
            return Err(ServiceError::UserNotVerified);
        }

        let number = card.normalized_number()?;
        self.payouts.register_payout_method(user_id, &card).await?;

        let masked = mask_card_number(&number);
        self.repos.users.set_card_number(user_id, &masked).await?;
        user.card_number = Some(masked);
        tracing::info!(user_id, "Payout method set up");
        Ok(user)
    }

    /// Creates or updates the tier of the user's first channel.
    pub async fn publish_subscription(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        button_text: &str,
        price: f64,
    ) -> ServiceResult<Subscription> {
        validation::validate_tier(title, price)?;
        let user = self.require_user(user_id).await?;

        let channels = self.repos.channels.find_by_user_id(user_id).await?;
        let channel = channels.first().ok_or(ServiceError::NoChannels)?;

        let subscription = match self.repos.subscriptions.find_by_channel_id(channel.id).await? {
            Some(mut existing) => {
                existing.title = title.to_string();
                existing.description = description.to_string();
                existing.button_text = button_text.to_string();
                existing.price = price;
                self.repos.subscriptions.update(&existing).await?;
                existing
            }
            None => {
                let created = Subscription {
                    id: Uuid::new_v4(),
                    channel_id: channel.id,
                    user_id,
                    channel_username: channel.channel_username.clone(),
                    title: title.to_string(),
                    description: description.to_string(),
                    button_text: button_text.to_string(),
                    price,
                    created_date: self.clock.now(),
                };
                self.repos.subscriptions.create(&created).await?;
                created
            }
        };

        if !user.is_sub_published {
            self.repos.users.mark_sub_published(user_id).await?;
        }
        tracing::info!(user_id, subscription_id = %subscription.id, price, "Subscription published");
        Ok(subscription)
    }

    /// Subscribes `subscriber_id` to the tier of `creator_id`'s first channel.
    ///
    /// The payment and the creator's credit are written in one transaction.
    pub async fn subscribe(&self, subscriber_id: i64, creator_id: i64, price: f64) -> ServiceResult<Payment> {
        if subscriber_id == creator_id {
            return Err(ServiceError::Validation("cannot subscribe to your own channel".to_string()));
        }
        self.require_user(subscriber_id).await?;

        let creator_channels = self.repos.channels.find_by_user_id(creator_id).await?;
        let channel = creator_channels.first().ok_or(ServiceError::CreatorHasNoChannels)?;
        let tier = self
            .repos
            .subscriptions
            .find_by_channel_id(channel.id)
            .await?
            .ok_or(ServiceError::NoSubscriptionTier)?;

        self.require_user(creator_id).await?;

        if !validation::prices_match(tier.price, price) {
            return Err(ServiceError::PriceMismatch {
                expected: tier.price,
                offered: price,
            });
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: subscriber_id,
            description: format!("Subscription to user {creator_id}"),
            amount: tier.price,
            created_date: self.clock.now(),
        };
        self.repos.payments.record_subscription(&payment, creator_id).await?;

        tracing::info!(subscriber_id, creator_id, amount = tier.price, "Subscription created");
        Ok(payment)
    }
}

fn decode_document(encoded: &str, field: &'static str) -> ServiceResult<Vec<u8>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(ServiceError::InvalidDocument(field));
    }
    BASE64
        .decode(encoded)
        .map_err(|_| ServiceError::InvalidDocument(field))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_document() {
        assert_eq!(decode_document("aGVsbG8=", "user-photo").unwrap(), b"hello");
        assert!(matches!(
            decode_document("", "user-photo"),
            Err(ServiceError::InvalidDocument("user-photo"))
        ));
        assert!(matches!(
            decode_document("not base64!", "user-passport"),
            Err(ServiceError::InvalidDocument("user-passport"))
        ));
    }
}
