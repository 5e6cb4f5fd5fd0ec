//! HTTP API for the Mini App
//!
//! - `auth`: `TgAuth` and webhook secret middleware
//! - `dto`: wire types
//! - `error`: error-to-status mapping
//! - `handlers`: one function per route
//! - `infra`: health probes and webhook de-duplication

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod infra;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use secrecy::SecretString;
use tower_http::trace::TraceLayer;

use tributecore::auth::Clock;
use tributecore::InitDataValidator;

use crate::service::TributeService;

pub use error::ApiError;
pub use infra::{CacheStatus, Infrastructure, ServerInfrastructure};

/// Shared state for all endpoints
#[derive(Clone)]
pub struct AppState {
    pub service: TributeService,
    pub validator: Arc<InitDataValidator>,
    pub clock: Arc<dyn Clock>,
    pub infra: Arc<dyn Infrastructure>,
    pub webhook_secret: Arc<SecretString>,
    /// Only verification callbacks from this chat are applied
    pub admin_chat_id: i64,
}

/// Builds the complete router: health check, the secret-checked Telegram
/// webhook, `TgAuth`-protected routes, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let protected = Router::new()
        .route("/api/v1/dashboard", get(handlers::dashboard))
        .route("/api/v1/onboard", put(handlers::onboard))
        .route("/api/v1/create-user", post(handlers::create_user))
        .route("/api/v1/add-bot", post(handlers::add_bot))
        .route("/api/v1/channel-list", get(handlers::channel_list))
        .route("/api/v1/check-channel", post(handlers::check_channel))
        .route("/api/v1/upload-verified-passport", post(handlers::upload_verified_passport))
        .route("/api/v1/set-up-payouts", post(handlers::set_up_payouts))
        .route("/api/v1/publish-subscription", put(handlers::publish_subscription))
        .route("/api/v1/create-subscribe", post(handlers::create_subscribe))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_init_data));

    let webhook = Router::new()
        .route("/api/v1/check-verified-passport", post(handlers::check_verified_passport))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_webhook_secret));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(webhook)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` on `0.0.0.0:port` until `shutdown` resolves.
pub async fn serve<F>(app: Router, port: u16, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
