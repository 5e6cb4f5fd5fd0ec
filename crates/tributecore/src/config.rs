//! Runtime configuration.
//!
//! Everything is read once at startup into a [`Config`] value that `main`
//! threads through constructors. Empty variables count as unset.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::auth::DEFAULT_MAX_AGE;

/// Scheme token expected in `Authorization: TgAuth <initData>`.
pub const AUTH_SCHEME: &str = "TgAuth";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default size of the PostgreSQL pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// PostgreSQL connection settings
#[derive(Debug)]
pub struct DatabaseConfig {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug)]
pub struct Config {
    /// Bot token: HMAC secret for initData and Bot API credential
    pub bot_token: SecretString,
    /// Chat that receives passport verification requests
    pub admin_chat_id: i64,
    /// `secret_token` registered with `setWebhook`; Telegram echoes it in
    /// `X-Telegram-Bot-Api-Secret-Token`
    pub webhook_secret: SecretString,
    pub database: DatabaseConfig,
    /// `None` disables Redis (health reports "disabled", webhook de-duplication is skipped)
    pub redis_url: Option<SecretString>,
    pub port: u16,
    /// Freshness window for initData `auth_date`
    pub init_data_max_age: Duration,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or = |name: &str, fallback: &str| get(name).unwrap_or_else(|| fallback.to_string());

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admin_chat_id = get("TELEGRAM_ADMIN_CHAT_ID").ok_or(ConfigError::Missing("TELEGRAM_ADMIN_CHAT_ID"))?;
        let admin_chat_id = parse_number("TELEGRAM_ADMIN_CHAT_ID", &admin_chat_id)?;

        let webhook_secret = get("TELEGRAM_WEBHOOK_SECRET").ok_or(ConfigError::Missing("TELEGRAM_WEBHOOK_SECRET"))?;

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={ssl}",
                user = urlencoding::encode(&get_or("DB_USER", "postgres")),
                password = urlencoding::encode(&get_or("DB_PASSWORD", "password")),
                host = get_or("DB_HOST", "localhost"),
                port = get_or("DB_PORT", "5432"),
                name = get_or("DB_NAME", "tribute_db"),
                ssl = get_or("DB_SSL_MODE", "disable"),
            ),
        };
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DB_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let redis_url = get("REDIS_URL").or_else(|| {
            get("REDIS_HOST").map(|host| {
                let port = get_or("REDIS_PORT", "6379");
                match get("REDIS_PASSWORD") {
                    Some(password) => format!("redis://:{}@{host}:{port}/0", urlencoding::encode(&password)),
                    None => format!("redis://{host}:{port}/0"),
                }
            })
        });

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let init_data_max_age = match get("INIT_DATA_MAX_AGE_SECS") {
            Some(raw) => Duration::from_secs(parse_number("INIT_DATA_MAX_AGE_SECS", &raw)?),
            None => DEFAULT_MAX_AGE,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            admin_chat_id,
            webhook_secret: SecretString::from(webhook_secret),
            database: DatabaseConfig {
                url: SecretString::from(database_url),
                max_connections,
            },
            redis_url: redis_url.map(SecretString::from),
            port,
            init_data_max_age,
        })
    }

    pub fn redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Database URL with the password replaced, safe for logs.
    pub fn database_url_redacted(&self) -> String {
        redact_url_password(self.database.url.expose_secret())
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn redact_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
