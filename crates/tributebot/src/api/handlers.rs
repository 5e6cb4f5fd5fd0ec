use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use teloxide::types::{Update, UpdateKind};

use tributecore::payouts::CardDetails;
use tributecore::AuthenticatedPrincipal;

use super::dto::{
    AddBotRequest, AddBotResponse, ChannelDto, CheckChannelRequest, CheckChannelResponse, CreateSubscribeRequest,
    DashboardResponse, HealthResponse, MessageResponse, OnboardResponse, PublishSubscriptionRequest,
    PublishSubscriptionResponse, SetUpPayoutsRequest, StatusResponse, UploadVerifiedPassportRequest,
    UserResponse,
};
use super::error::ApiError;
use super::AppState;

type ApiResult<T> = Result<T, ApiError>;

fn created_status(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

// ============================================================================
// Public
// ============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (database, cache) = tokio::join!(state.infra.database_ok(), state.infra.cache_status());
    Json(HealthResponse {
        status: "ok",
        database,
        cache: cache.as_str(),
    })
}

/// POST /api/v1/check-verified-passport - Telegram webhook for the admin buttons
///
/// Only reached with a valid secret token. Callbacks are applied only when the
/// button was pressed in the admin chat.
pub async fn check_verified_passport(
    State(state): State<AppState>,
    body: Result<Json<Update>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Json(update) = body.map_err(|_| ApiError::BadRequest("Cannot parse Telegram update".to_string()))?;
    let update_id = i64::from(update.id.0);

    let callback = match update.kind {
        UpdateKind::CallbackQuery(query) => query.message.zip(query.data),
        _ => None,
    };
    let Some((message, data)) = callback else {
        tracing::debug!(update_id, "Ignoring update without verification callback");
        return Ok(Json(StatusResponse { status: "ignored" }));
    };

    let chat_id = message.chat().id.0;
    if chat_id != state.admin_chat_id {
        tracing::warn!(update_id, chat_id, "Ignoring verification callback from a non-admin chat");
        return Ok(Json(StatusResponse { status: "ignored" }));
    }

    if !state.infra.claim_update(update_id).await {
        tracing::info!(update_id, "Duplicate update delivery");
        return Ok(Json(StatusResponse { status: "duplicate" }));
    }

    state
        .service
        .handle_verification_callback(chat_id, message.id().0, &data)
        .await?;
    Ok(Json(StatusResponse { status: "ok" }))
}

// ============================================================================
// Protected
// ============================================================================

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiResult<Json<DashboardResponse>> {
    let dashboard = state.service.dashboard(principal.user_id).await?;
    Ok(Json(dashboard.into()))
}

/// PUT /api/v1/onboard
pub async fn onboard(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiResult<(StatusCode, Json<OnboardResponse>)> {
    let (user, created) = state.service.onboard(principal.user_id).await?;
    let response = OnboardResponse {
        message: "User is onboarded successfully",
        user: UserResponse::from(user),
    };
    Ok((created_status(created), Json(response)))
}

/// POST /api/v1/create-user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiResult<(StatusCode, Json<DashboardResponse>)> {
    let (dashboard, created) = state.service.create_user(principal.user_id).await?;
    Ok((created_status(created), Json(dashboard.into())))
}

/// POST /api/v1/add-bot
pub async fn add_bot(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<AddBotRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AddBotResponse>)> {
    let Json(req) = body?;
    if req.user_id.is_some_and(|id| id != principal.user_id) {
        tracing::warn!(
            user_id = principal.user_id,
            body_user_id = ?req.user_id,
            "add-bot body names another user, using the authenticated one"
        );
    }

    let channel = state
        .service
        .add_channel(principal.user_id, &req.channel_title, &req.channel_username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddBotResponse {
            message: "Channel added successfully",
            channel: channel.into(),
        }),
    ))
}

/// GET /api/v1/channel-list
pub async fn channel_list(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiResult<Json<Vec<ChannelDto>>> {
    let channels = state.service.channels(principal.user_id).await?;
    Ok(Json(channels.into_iter().map(ChannelDto::from).collect()))
}

/// POST /api/v1/check-channel
pub async fn check_channel(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<CheckChannelRequest>, JsonRejection>,
) -> ApiResult<Json<CheckChannelResponse>> {
    let Json(req) = body?;
    let is_owner = state.service.check_channel(principal.user_id, req.channel_id).await?;
    Ok(Json(CheckChannelResponse { is_owner }))
}

/// POST /api/v1/upload-verified-passport
pub async fn upload_verified_passport(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<UploadVerifiedPassportRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = body?;
    state
        .service
        .request_verification(principal.user_id, &req.user_photo, &req.user_passport)
        .await?;
    Ok(Json(MessageResponse::new("Verification request sent successfully")))
}

/// POST /api/v1/set-up-payouts
pub async fn set_up_payouts(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<SetUpPayoutsRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = body?;
    let card = CardDetails {
        card_number: req.card_number,
        card_date: req.card_date,
        card_cvv: req.card_cvv,
    };
    state.service.set_up_payouts(principal.user_id, card).await?;
    Ok(Json(MessageResponse::new("Payout method set up successfully")))
}

/// PUT /api/v1/publish-subscription
pub async fn publish_subscription(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<PublishSubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<PublishSubscriptionResponse>> {
    let Json(req) = body?;
    let subscription = state
        .service
        .publish_subscription(principal.user_id, &req.title, &req.description, &req.button_text, req.price)
        .await?;

    Ok(Json(PublishSubscriptionResponse {
        message: "Subscription published successfully",
        subscription: subscription.into(),
    }))
}

/// POST /api/v1/create-subscribe - the caller subscribes to `user_id`
pub async fn create_subscribe(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    body: Result<Json<CreateSubscribeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = body?;
    state
        .service
        .subscribe(principal.user_id, req.user_id, req.price)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Successfully subscribed"))))
}
