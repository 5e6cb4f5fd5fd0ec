//! Tributecore - domain library for the Tribute subscription platform
//!
//! Everything that does not talk to the Telegram Bot API lives here.
//!
//! # Module Structure
//!
//! - `auth`: Telegram Mini App `initData` validation
//! - `config`: environment configuration
//! - `storage`: repository traits, PostgreSQL implementations, migrations
//! - `cache`: optional Redis connection
//! - `payouts`: payout gateway and card handling
//! - `logging`: tracing subscriber setup

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod payouts;
pub mod storage;

// Re-export commonly used types for convenience
pub use auth::{AuthenticatedPrincipal, InitDataError, InitDataValidator};
pub use config::Config;
pub use error::{AppError, AppResult};
