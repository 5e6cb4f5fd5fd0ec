//! Input checks shared by service operations

use super::ServiceError;

/// Telegram public usernames are at most 32 characters.
const MAX_CHANNEL_USERNAME_LEN: usize = 32;

/// Two prices closer than this are the same amount.
pub const PRICE_TOLERANCE: f64 = 0.005;

/// Strips one leading `@` and checks the remaining username.
pub fn normalize_channel_username(raw: &str) -> Result<String, ServiceError> {
    let username = raw.trim();
    let username = username.strip_prefix('@').unwrap_or(username);

    if username.is_empty() {
        return Err(ServiceError::InvalidChannelUsername("channel username is empty".to_string()));
    }
    if username.len() > MAX_CHANNEL_USERNAME_LEN {
        return Err(ServiceError::InvalidChannelUsername(format!(
            "channel username is longer than {MAX_CHANNEL_USERNAME_LEN} characters"
        )));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ServiceError::InvalidChannelUsername(format!(
            "channel username {username:?} may only contain letters, digits and underscores"
        )));
    }
    Ok(username.to_string())
}

pub fn validate_tier(title: &str, price: f64) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".to_string()));
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(ServiceError::Validation("price must be greater than zero".to_string()));
    }
    Ok(())
}

pub fn prices_match(expected: f64, offered: f64) -> bool {
    (expected - offered).abs() < PRICE_TOLERANCE
}
