use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use tributecore::payouts::PayoutError;

use crate::service::ServiceError;

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// Details are logged where the error is created, never sent
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Internal => "Internal server error".to_string(),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            ServiceError::UserNotVerified => ApiError::Forbidden(err.to_string()),
            ServiceError::ChannelAlreadyAdded => ApiError::Conflict(err.to_string()),
            ServiceError::Payout(PayoutError::Unavailable(_)) | ServiceError::Storage(_) | ServiceError::Bot(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::Internal
            }
            ServiceError::ChannelNotFound
            | ServiceError::ChannelNotOwned
            | ServiceError::InvalidChannelUsername(_)
            | ServiceError::InvalidDocument(_)
            | ServiceError::InvalidCallback(_)
            | ServiceError::NoChannels
            | ServiceError::CreatorHasNoChannels
            | ServiceError::NoSubscriptionTier
            | ServiceError::PriceMismatch { .. }
            | ServiceError::Validation(_)
            | ServiceError::Payout(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}
