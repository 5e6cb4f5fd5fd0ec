//! Bot API calls used by the service
//!
//! The service only depends on [`BotGateway`]; [`TeloxideGateway`] is the
//! production implementation, tests use a recording mock.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, Recipient};
use thiserror::Error;

use super::callback::{VerificationAction, VerificationCallback};

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Telegram error: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("invalid Telegram user id: {0}")]
    InvalidUserId(i64),
}

/// Role of a user in a channel, as far as ownership checks care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Other,
}

impl MemberStatus {
    pub fn can_manage(self) -> bool {
        matches!(self, MemberStatus::Owner | MemberStatus::Administrator)
    }
}

#[async_trait]
pub trait BotGateway: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError>;

    /// Posts both documents to the admin chat, then a message with
    /// approve/reject buttons for `user_id`.
    async fn send_verification_request(&self, user_id: i64, photo: Vec<u8>, passport: Vec<u8>) -> Result<(), BotError>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), BotError>;

    /// `getChatMember` for `user_id` in the public channel `@channel_username`.
    async fn member_status(&self, channel_username: &str, user_id: i64) -> Result<MemberStatus, BotError>;
}

pub struct TeloxideGateway {
    bot: Bot,
    admin_chat_id: ChatId,
}

impl TeloxideGateway {
    pub fn new(bot_token: &SecretString, admin_chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token.expose_secret()),
            admin_chat_id: ChatId(admin_chat_id),
        }
    }

    async fn send_document_photo(&self, photo: Vec<u8>, file_name: &'static str, caption: String) -> Result<(), BotError> {
        self.bot
            .send_photo(self.admin_chat_id, InputFile::memory(photo).file_name(file_name))
            .caption(caption)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BotGateway for TeloxideGateway {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        tracing::debug!(chat_id, "Sent message");
        Ok(())
    }

    async fn send_verification_request(&self, user_id: i64, photo: Vec<u8>, passport: Vec<u8>) -> Result<(), BotError> {
        self.send_document_photo(photo, "photo.jpg", format!("User Photo for UserID: {user_id}"))
            .await?;
        self.send_document_photo(passport, "passport.jpg", format!("User Passport for UserID: {user_id}"))
            .await?;

        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback(
                "Подтвердить",
                VerificationCallback::new(VerificationAction::Approve, user_id).to_callback_data(),
            ),
            InlineKeyboardButton::callback(
                "Отклонить",
                VerificationCallback::new(VerificationAction::Reject, user_id).to_callback_data(),
            ),
        ]]);

        self.bot
            .send_message(self.admin_chat_id, format!("Please verify user with ID: {user_id}"))
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), BotError> {
        self.bot.delete_message(ChatId(chat_id), MessageId(message_id)).await?;
        Ok(())
    }

    async fn member_status(&self, channel_username: &str, user_id: i64) -> Result<MemberStatus, BotError> {
        let telegram_user_id = u64::try_from(user_id).map_err(|_| BotError::InvalidUserId(user_id))?;
        let channel = Recipient::ChannelUsername(format!("@{}", channel_username.trim_start_matches('@')));

        let member = self.bot.get_chat_member(channel, UserId(telegram_user_id)).await?;

        Ok(match member.kind {
            ChatMemberKind::Owner(_) => MemberStatus::Owner,
            ChatMemberKind::Administrator(_) => MemberStatus::Administrator,
            _ => MemberStatus::Other,
        })
    }
}
