//! Telegram Bot API integration
//!
//! - `bot`: the [`BotGateway`] seam and its teloxide implementation
//! - `callback`: admin verification button payloads

pub mod bot;
pub mod callback;

pub use bot::{BotError, BotGateway, MemberStatus, TeloxideGateway};
pub use callback::{CallbackParseError, VerificationAction, VerificationCallback};
