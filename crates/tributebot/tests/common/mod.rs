//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{sign_init_data, verified_user, TestApp, ADMIN_CHAT_ID, AUTH_DATE, BOT_TOKEN, NOW, WEBHOOK_SECRET};
#[allow(unused_imports)]
pub use mocks::{BotCall, InMemoryStore, MockInfrastructure, RecordingBot};
