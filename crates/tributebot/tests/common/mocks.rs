//! In-memory stand-ins for PostgreSQL, Redis and the Bot API

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use tributebot::api::{CacheStatus, Infrastructure};
use tributebot::telegram::{BotError, BotGateway, MemberStatus};
use tributecore::models::{Channel, Payment, Subscription, User};
use tributecore::storage::{ChannelRepository, PaymentRepository, SubscriptionRepository, UserRepository};
use tributecore::{AppError, AppResult};

// ============================================================================
// Repositories
// ============================================================================

/// One store backing all four repository traits.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<i64, User>>,
    channels: Mutex<Vec<Channel>>,
    subscriptions: Mutex<Vec<Subscription>>,
    payments: Mutex<Vec<Payment>>,
}

impl InMemoryStore {
    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels.lock().unwrap().push(channel);
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        self.subscriptions.lock().unwrap().push(subscription);
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn all_channels(&self) -> Vec<Channel> {
        self.channels.lock().unwrap().clone()
    }

    pub fn all_subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn all_payments(&self) -> Vec<Payment> {
        self.payments.lock().unwrap().clone()
    }

    fn modify_user(&self, id: i64, change: impl FnOnce(&mut User)) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            change(user);
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        // Let concurrent tasks interleave between reads and writes, as a pool does
        tokio::task::yield_now().await;
        Ok(self.user(id))
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        self.insert_user(user.clone());
        Ok(())
    }

    async fn mark_onboarded(&self, id: i64) -> AppResult<()> {
        self.modify_user(id, |user| user.is_onboarded = true);
        Ok(())
    }

    async fn set_verified(&self, id: i64) -> AppResult<()> {
        self.modify_user(id, |user| user.is_verified = true);
        Ok(())
    }

    async fn set_card_number(&self, id: i64, masked: &str) -> AppResult<()> {
        self.modify_user(id, |user| user.card_number = Some(masked.to_string()));
        Ok(())
    }

    async fn mark_sub_published(&self, id: i64) -> AppResult<()> {
        self.modify_user(id, |user| user.is_sub_published = true);
        Ok(())
    }
}

#[async_trait]
impl ChannelRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Channel>> {
        Ok(self.all_channels().into_iter().filter(|ch| ch.user_id == user_id).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Channel>> {
        Ok(self.all_channels().into_iter().find(|ch| ch.id == id))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Channel>> {
        Ok(self
            .all_channels()
            .into_iter()
            .find(|ch| ch.channel_username.eq_ignore_ascii_case(username)))
    }

    async fn create(&self, channel: &Channel) -> AppResult<()> {
        self.insert_channel(channel.clone());
        Ok(())
    }

    async fn update(&self, channel: &Channel) -> AppResult<()> {
        let mut channels = self.channels.lock().unwrap();
        if let Some(stored) = channels.iter_mut().find(|ch| ch.id == channel.id) {
            *stored = channel.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.channels.lock().unwrap().retain(|ch| ch.id != id);
        // ON DELETE CASCADE
        self.subscriptions.lock().unwrap().retain(|sub| sub.channel_id != id);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Subscription>> {
        Ok(self
            .all_subscriptions()
            .into_iter()
            .filter(|sub| sub.user_id == user_id)
            .collect())
    }

    async fn find_by_channel_id(&self, channel_id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.all_subscriptions().into_iter().find(|sub| sub.channel_id == channel_id))
    }

    async fn create(&self, subscription: &Subscription) -> AppResult<()> {
        self.insert_subscription(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(stored) = subscriptions.iter_mut().find(|sub| sub.id == subscription.id) {
            *stored = subscription.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .all_payments()
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        payments.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        Ok(payments)
    }

    async fn record_subscription(&self, payment: &Payment, creator_id: i64) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let creator = users
            .get_mut(&creator_id)
            .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
        creator.earned += payment.amount;
        self.payments.lock().unwrap().push(payment.clone());
        Ok(())
    }
}

// ============================================================================
// Bot API
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCall {
    SendMessage { chat_id: i64, text: String },
    VerificationRequest { user_id: i64, photo: Vec<u8>, passport: Vec<u8> },
    DeleteMessage { chat_id: i64, message_id: i32 },
    MemberStatus { channel_username: String, user_id: i64 },
}

/// Records every call; `getChatMember` answers with a configurable status.
pub struct RecordingBot {
    calls: Mutex<Vec<BotCall>>,
    member_status: Mutex<MemberStatus>,
    fail_messages: Mutex<bool>,
}

impl Default for RecordingBot {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            member_status: Mutex::new(MemberStatus::Owner),
            fail_messages: Mutex::new(false),
        }
    }
}

impl RecordingBot {
    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_member_status(&self, status: MemberStatus) {
        *self.member_status.lock().unwrap() = status;
    }

    /// Make `send_message` fail from now on.
    pub fn fail_messages(&self) {
        *self.fail_messages.lock().unwrap() = true;
    }

    fn record(&self, call: BotCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BotGateway for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.record(BotCall::SendMessage {
            chat_id,
            text: text.to_string(),
        });
        if *self.fail_messages.lock().unwrap() {
            return Err(BotError::InvalidUserId(chat_id));
        }
        Ok(())
    }

    async fn send_verification_request(&self, user_id: i64, photo: Vec<u8>, passport: Vec<u8>) -> Result<(), BotError> {
        self.record(BotCall::VerificationRequest {
            user_id,
            photo,
            passport,
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), BotError> {
        self.record(BotCall::DeleteMessage { chat_id, message_id });
        Ok(())
    }

    async fn member_status(&self, channel_username: &str, user_id: i64) -> Result<MemberStatus, BotError> {
        self.record(BotCall::MemberStatus {
            channel_username: channel_username.to_string(),
            user_id,
        });
        Ok(*self.member_status.lock().unwrap())
    }
}

// ============================================================================
// Infrastructure
// ============================================================================

/// Healthy database, disabled cache, de-duplication by a `HashSet`.
#[derive(Default)]
pub struct MockInfrastructure {
    seen_updates: Mutex<HashSet<i64>>,
}

#[async_trait]
impl Infrastructure for MockInfrastructure {
    async fn database_ok(&self) -> bool {
        true
    }

    async fn cache_status(&self) -> CacheStatus {
        CacheStatus::Disabled
    }

    async fn claim_update(&self, update_id: i64) -> bool {
        self.seen_updates.lock().unwrap().insert(update_id)
    }
}
