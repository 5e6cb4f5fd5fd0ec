//! Telegram Mini App `initData` validation.
//!
//! Telegram signs the launch payload with HMAC-SHA256:
//!
//! - `secret_key = HMAC_SHA256(key = "WebAppData", message = bot_token)`
//! - `hash = hex(HMAC_SHA256(key = secret_key, message = data_check_string))`
//!
//! where `data_check_string` is every field except `hash`, rendered as
//! `key=value` lines sorted in byte order and joined with `\n`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";
const HASH_FIELD: &str = "hash";
const USER_FIELD: &str = "user";
const AUTH_DATE_FIELD: &str = "auth_date";

/// Default freshness window for `auth_date`.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Reason an `initData` payload was rejected.
///
/// Every variant is terminal: the client has to obtain a fresh `initData`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitDataError {
    #[error("init data is not a valid query string: {0}")]
    MalformedQueryString(String),

    #[error("hash field is missing from init data")]
    MissingSignature,

    #[error("hash validation failed")]
    InvalidSignature,

    #[error("user field is missing or malformed: {0}")]
    MalformedUser(String),

    #[error("auth_date field is missing or is not a unix timestamp")]
    MalformedAuthDate,

    #[error("init data is outdated ({age_secs}s old, allowed {max_age_secs}s)")]
    Expired { age_secs: i64, max_age_secs: u64 },
}

/// Identity extracted from a successfully validated payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedPrincipal {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub auth_date: DateTime<Utc>,
}

/// Shape of the JSON-encoded `user` field. Unknown fields
/// (`language_code`, `is_premium`, `photo_url`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct InitDataUser {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

/// Validates Telegram `initData` payloads for one bot.
///
/// The `WebAppData` secret key only depends on the bot token, so it is derived
/// once here and kept for the lifetime of the validator. Validation itself is a
/// pure function of the payload and the supplied `now`.
pub struct InitDataValidator {
    secret_key: SecretBox<[u8; 32]>,
    max_age: Duration,
}

impl std::fmt::Debug for InitDataValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitDataValidator")
            .field("secret_key", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl InitDataValidator {
    pub fn new(bot_token: &SecretString, max_age: Duration) -> Self {
        let secret_key = hmac_sha256(WEB_APP_DATA_KEY, bot_token.expose_secret().as_bytes());
        Self {
            secret_key: SecretBox::new(Box::new(secret_key)),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Checks signature and freshness of `init_data` and extracts the principal.
    ///
    /// `auth_date` values in the future are accepted: Telegram clients can run
    /// with a skewed clock and the signature already proves authenticity.
    ///
    /// # Errors
    /// Returns the first [`InitDataError`] encountered, in the order: query
    /// parsing, missing hash, signature, `user`, `auth_date`, freshness.
    pub fn validate(&self, init_data: &str, now: DateTime<Utc>) -> Result<AuthenticatedPrincipal, InitDataError> {
        let params = parse_query(init_data)?;

        let claimed_hash = params
            .get(HASH_FIELD)
            .filter(|hash| !hash.is_empty())
            .ok_or(InitDataError::MissingSignature)?;

        let check_string = data_check_string(
            params
                .iter()
                .filter(|(key, _)| key.as_str() != HASH_FIELD)
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
        let calculated_hash = hex::encode(hmac_sha256(self.secret_key.expose_secret(), check_string.as_bytes()));

        if !bool::from(calculated_hash.as_bytes().ct_eq(claimed_hash.as_bytes())) {
            return Err(InitDataError::InvalidSignature);
        }

        let user = parse_user(params.get(USER_FIELD).map(String::as_str))?;

        let auth_date = params
            .get(AUTH_DATE_FIELD)
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or(InitDataError::MalformedAuthDate)?;
        let issued_at = DateTime::from_timestamp(auth_date, 0).ok_or(InitDataError::MalformedAuthDate)?;

        let age_secs = now.timestamp().saturating_sub(auth_date);
        let max_age_secs = self.max_age.as_secs();
        if u64::try_from(age_secs).is_ok_and(|age| age > max_age_secs) {
            return Err(InitDataError::Expired { age_secs, max_age_secs });
        }

        Ok(AuthenticatedPrincipal {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            auth_date: issued_at,
        })
    }

    /// Builds a signed `initData` query string from `fields`.
    ///
    /// Keys must be unique and must not include `hash`. Used by the
    /// `sign-init-data` CLI command to mint credentials for local testing.
    pub fn sign(&self, fields: &[(&str, &str)]) -> String {
        let check_string = data_check_string(fields.iter().copied());
        let hash = hex::encode(hmac_sha256(self.secret_key.expose_secret(), check_string.as_bytes()));

        let mut query: Vec<String> = fields
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect();
        query.push(format!("{HASH_FIELD}={hash}"));
        query.join("&")
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

fn data_check_string<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut lines: Vec<String> = pairs.map(|(key, value)| format!("{key}={value}")).collect();
    lines.sort();
    lines.join("\n")
}

/// Parses a URL query string; the first occurrence of a key wins.
fn parse_query(init_data: &str) -> Result<HashMap<String, String>, InitDataError> {
    let mut params = HashMap::new();

    for pair in init_data.split('&') {
        if pair.is_empty() {
            continue;
        }
        if pair.contains(';') {
            return Err(InitDataError::MalformedQueryString(
                "invalid semicolon separator".to_string(),
            ));
        }

        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        params.entry(key).or_insert(value);
    }

    Ok(params)
}

fn decode_component(raw: &str) -> Result<String, InitDataError> {
    // urlencoding passes broken escapes through untouched, reject them here
    let bytes = raw.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }
        let well_formed = matches!(
            (bytes.get(index + 1), bytes.get(index + 2)),
            (Some(high), Some(low)) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit()
        );
        if !well_formed {
            return Err(InitDataError::MalformedQueryString(format!(
                "invalid percent escape at byte {index}"
            )));
        }
    }

    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|e| InitDataError::MalformedQueryString(e.to_string()))
}

fn parse_user(raw: Option<&str>) -> Result<InitDataUser, InitDataError> {
    let raw = raw
        .filter(|value| !value.is_empty())
        .ok_or_else(|| InitDataError::MalformedUser("user field is missing".to_string()))?;

    serde_json::from_str(raw).map_err(|e| InitDataError::MalformedUser(e.to_string()))
}
