//! Request and response bodies
//!
//! Field names follow the Mini App's existing wire format, which mixes
//! `snake_case` and `kebab-case`.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tributecore::models::{Channel, Payment, Subscription, User};

use crate::service::Dashboard;

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub cache: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub earned: f64,
    pub is_verified: bool,
    pub is_sub_published: bool,
    pub is_onboarded: bool,
    /// Masked card, empty when no payout method is set up
    pub card_number: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            earned: user.earned,
            is_verified: user.is_verified,
            is_sub_published: user.is_sub_published,
            is_onboarded: user.is_onboarded,
            card_number: user.card_number.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChannelDto {
    pub id: Uuid,
    pub channel_title: String,
    pub channel_username: String,
    pub is_verified: bool,
}

impl From<Channel> for ChannelDto {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            channel_title: channel.channel_title,
            channel_username: channel.channel_username,
            is_verified: channel.is_verified,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "button-text")]
    pub button_text: String,
    pub price: f64,
}

impl From<Subscription> for SubscriptionDto {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            title: subscription.title,
            description: subscription.description,
            button_text: subscription.button_text,
            price: subscription.price,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PaymentDto {
    pub description: String,
    pub amount: f64,
    /// RFC 3339, seconds precision
    #[serde(rename = "created-date")]
    pub created_date: String,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            description: payment.description,
            amount: payment.amount,
            created_date: payment.created_date.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

// ============================================================================
// Dashboard / onboarding
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub earn: f64,
    #[serde(rename = "channels-and-groups")]
    pub channels_and_groups: Vec<ChannelDto>,
    #[serde(rename = "is-verified")]
    pub is_verified: bool,
    pub subscriptions: Vec<SubscriptionDto>,
    #[serde(rename = "is-sub-published")]
    pub is_sub_published: bool,
    #[serde(rename = "payments-history")]
    pub payments_history: Vec<PaymentDto>,
    pub card_number: String,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            earn: dashboard.user.earned,
            channels_and_groups: dashboard.channels.into_iter().map(ChannelDto::from).collect(),
            is_verified: dashboard.user.is_verified,
            subscriptions: dashboard.subscriptions.into_iter().map(SubscriptionDto::from).collect(),
            is_sub_published: dashboard.user.is_sub_published,
            payments_history: dashboard.payments.into_iter().map(PaymentDto::from).collect(),
            card_number: dashboard.user.card_number.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OnboardResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

// ============================================================================
// Channels
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddBotRequest {
    /// Accepted for compatibility; the authenticated user is always used
    #[serde(default)]
    pub user_id: Option<i64>,
    pub channel_title: String,
    pub channel_username: String,
}

#[derive(Debug, Serialize)]
pub struct AddBotResponse {
    pub message: &'static str,
    pub channel: ChannelDto,
}

#[derive(Debug, Deserialize)]
pub struct CheckChannelRequest {
    pub channel_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CheckChannelResponse {
    pub is_owner: bool,
}

// ============================================================================
// Verification / payouts
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UploadVerifiedPassportRequest {
    #[serde(rename = "user-photo", default)]
    pub user_photo: String,
    #[serde(rename = "user-passport", default)]
    pub user_passport: String,
}

#[derive(Deserialize)]
pub struct SetUpPayoutsRequest {
    #[serde(rename = "card-number")]
    pub card_number: String,
    #[serde(rename = "card-date", default)]
    pub card_date: Option<String>,
    #[serde(rename = "card-cvv", default)]
    pub card_cvv: Option<String>,
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PublishSubscriptionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "button-text", default)]
    pub button_text: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct PublishSubscriptionResponse {
    pub message: &'static str,
    pub subscription: SubscriptionDto,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubscribeRequest {
    /// Creator being subscribed to
    pub user_id: i64,
    pub price: f64,
}
