//! Tributebot - HTTP backend for the Tribute Telegram Mini App
//!
//! # Module Structure
//!
//! - `api`: axum router, `TgAuth` middleware, DTOs
//! - `service`: business operations
//! - `telegram`: Bot API gateway and admin callbacks
//! - `cli`: command line interface

pub mod api;
pub mod cli;
pub mod service;
pub mod telegram;

pub use api::{router, AppState};
pub use service::{Repositories, TributeService};
