//! Request authentication
//!
//! Protected routes require `Authorization: TgAuth <initData>`. The validated
//! [`AuthenticatedPrincipal`] is stored in the request extensions for
//! handlers to pick up with `Extension<AuthenticatedPrincipal>`.
//!
//! The Telegram webhook is authenticated separately by the secret token
//! Telegram sends in `X-Telegram-Bot-Api-Secret-Token`.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use tributecore::config::AUTH_SCHEME;
use tributecore::AuthenticatedPrincipal;

use super::error::ApiError;
use super::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Returns the raw initData from an `Authorization: TgAuth <initData>` header.
fn extract_init_data(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Authorization header is required".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Authorization header is not valid ASCII".to_string()))?;

    let (scheme, init_data) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::Unauthorized(format!("Authorization scheme must be {AUTH_SCHEME}")))?;
    if scheme != AUTH_SCHEME {
        return Err(ApiError::Unauthorized(format!("Authorization scheme must be {AUTH_SCHEME}")));
    }
    if init_data.is_empty() {
        return Err(ApiError::Unauthorized("Authorization header has no init data".to_string()));
    }
    Ok(init_data)
}

pub async fn require_init_data(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let init_data = extract_init_data(request.headers())?;

    let principal: AuthenticatedPrincipal = state.validator.validate(init_data, state.clock.now()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected init data");
        ApiError::Forbidden(e.to_string())
    })?;

    tracing::debug!(user_id = principal.user_id, "Authenticated request");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn check_webhook_secret(headers: &HeaderMap, expected: &SecretString) -> Result<(), ApiError> {
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("Webhook secret token is required".to_string()))?;

    if bool::from(provided.as_bytes().ct_eq(expected.expose_secret().as_bytes())) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Webhook secret token does not match".to_string()))
    }
}

pub async fn require_webhook_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = check_webhook_secret(request.headers(), &state.webhook_secret) {
        tracing::warn!("Rejected webhook call without a valid secret token");
        return Err(e);
    }
    Ok(next.run(request).await)
}
