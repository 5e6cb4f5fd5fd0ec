//! Persistent entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user, keyed by Telegram user id.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Total credited from subscribers
    pub earned: f64,
    /// Passport verification approved by an admin
    pub is_verified: bool,
    pub is_sub_published: bool,
    pub is_onboarded: bool,
    /// Masked payout card (`**** 1234`)
    pub card_number: Option<String>,
}

impl User {
    /// A freshly onboarded user with nothing else set.
    pub fn onboarded(id: i64) -> Self {
        Self {
            id,
            earned: 0.0,
            is_verified: false,
            is_sub_published: false,
            is_onboarded: true,
            card_number: None,
        }
    }
}

/// A Telegram channel registered by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Channel {
    pub id: Uuid,
    pub user_id: i64,
    pub channel_title: String,
    /// Stored without the leading `@`
    pub channel_username: String,
    /// Ownership confirmed through `getChatMember`
    pub is_verified: bool,
}

/// A creator's published subscription tier. At most one per channel.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub user_id: i64,
    pub channel_username: String,
    pub title: String,
    pub description: String,
    pub button_text: String,
    pub price: f64,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: i64,
    pub description: String,
    pub amount: f64,
    pub created_date: DateTime<Utc>,
}
