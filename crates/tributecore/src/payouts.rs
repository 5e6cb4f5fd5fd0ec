//! Payout methods
//!
//! Card details are handed to a [`PayoutGateway`] and never persisted; the
//! service keeps only [`mask_card_number`] output.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    #[error("card number must be 12 to 19 digits")]
    InvalidCardNumber,

    #[error("payout method declined: {0}")]
    Declined(String),

    #[error("payout gateway unavailable: {0}")]
    Unavailable(String),
}

/// Card as submitted by the user.
#[derive(Clone)]
pub struct CardDetails {
    pub card_number: String,
    pub card_date: Option<String>,
    pub card_cvv: Option<String>,
}

impl CardDetails {
    /// Digits of the card number with spaces removed.
    ///
    /// Fails unless the result is 12 to 19 ASCII digits.
    pub fn normalized_number(&self) -> Result<String, PayoutError> {
        let digits: String = self.card_number.chars().filter(|c| *c != ' ').collect();
        if !(12..=19).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PayoutError::InvalidCardNumber);
        }
        Ok(digits)
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("card_date", &self.card_date.as_ref().map(|_| "[REDACTED]"))
            .field("card_cvv", &self.card_cvv.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// `**** 1234` for anything with at least four digits, `****` otherwise.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return "****".to_string();
    }
    let last_four: String = digits[digits.len() - 4..].iter().collect();
    format!("**** {last_four}")
}

#[async_trait]
pub trait PayoutGateway: Send + Sync {
    async fn register_payout_method(&self, user_id: i64, card: &CardDetails) -> Result<(), PayoutError>;
}

/// Stand-in for a real payment provider.
///
/// Accepts every well-formed card except those with CVV `123`, which are
/// declined so the failure path can be exercised end to end.
#[derive(Debug, Default, Clone)]
pub struct MockPayoutGateway;

#[async_trait]
impl PayoutGateway for MockPayoutGateway {
    async fn register_payout_method(&self, user_id: i64, card: &CardDetails) -> Result<(), PayoutError> {
        let number = card.normalized_number()?;
        tracing::info!(
            user_id,
            card = %mask_card_number(&number),
            "Registering payout method with mock gateway"
        );

        if card.card_cvv.as_deref() == Some("123") {
            return Err(PayoutError::Declined("invalid card details".to_string()));
        }
        Ok(())
    }
}
