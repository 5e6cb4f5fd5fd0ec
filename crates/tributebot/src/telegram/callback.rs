//! Admin verification buttons
//!
//! Callback data has the form `verify_<action>_<user id>`, e.g.
//! `verify_approve_42`.

use std::fmt;

use thiserror::Error;

const CALLBACK_PREFIX: &str = "verify";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackParseError {
    #[error("invalid callback data format: {0}")]
    Format(String),

    #[error("unknown action in callback data: {0}")]
    UnknownAction(String),

    #[error("invalid user id in callback data: {0}")]
    UserId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationAction {
    Approve,
    Reject,
}

impl VerificationAction {
    fn as_str(self) -> &'static str {
        match self {
            VerificationAction::Approve => "approve",
            VerificationAction::Reject => "reject",
        }
    }
}

impl fmt::Display for VerificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationCallback {
    pub action: VerificationAction,
    pub user_id: i64,
}

impl VerificationCallback {
    pub fn new(action: VerificationAction, user_id: i64) -> Self {
        Self { action, user_id }
    }

    /// Parses `verify_<action>_<user id>`.
    ///
    /// The shape is checked first (three `_`-separated parts, `verify`
    /// prefix), then the action and the user id.
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let parts: Vec<&str> = data.split('_').collect();
        let [prefix, action, user_id] = parts.as_slice() else {
            return Err(CallbackParseError::Format(data.to_string()));
        };
        if *prefix != CALLBACK_PREFIX {
            return Err(CallbackParseError::Format(data.to_string()));
        }

        let action = match *action {
            "approve" => VerificationAction::Approve,
            "reject" => VerificationAction::Reject,
            other => return Err(CallbackParseError::UnknownAction(other.to_string())),
        };
        let user_id = user_id
            .parse::<i64>()
            .map_err(|_| CallbackParseError::UserId((*user_id).to_string()))?;

        Ok(Self { action, user_id })
    }

    pub fn to_callback_data(&self) -> String {
        format!("{CALLBACK_PREFIX}_{}_{}", self.action, self.user_id)
    }
}
