//! Test environment: service and router wired to in-memory mocks

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

use tributebot::api::auth::WEBHOOK_SECRET_HEADER;
use tributebot::api::{router, AppState};
use tributebot::service::{Repositories, TributeService};
use tributecore::auth::FixedClock;
use tributecore::models::{Channel, Subscription, User};
use tributecore::payouts::MockPayoutGateway;
use tributecore::InitDataValidator;

use super::mocks::{InMemoryStore, MockInfrastructure, RecordingBot};

pub const BOT_TOKEN: &str = "test-bot-token";

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub const ADMIN_CHAT_ID: i64 = -1001;

/// Frozen "now" for every test: one minute after the default `auth_date`
pub const NOW: i64 = 1_700_000_060;

pub const AUTH_DATE: i64 = 1_700_000_000;

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(NOW, 0).unwrap()
}

/// Signs initData the way Telegram does, independently of `InitDataValidator`.
pub fn sign_init_data(user_id: i64, auth_date: i64) -> String {
    let user = format!(r#"{{"id":{user_id},"first_name":"Ann"}}"#);
    let auth_date = auth_date.to_string();
    let check_string = format!("auth_date={auth_date}\nquery_id=AAH\nuser={user}");

    let mut mac = Hmac::<Sha256>::new_from_slice(b"WebAppData").unwrap();
    mac.update(BOT_TOKEN.as_bytes());
    let secret_key = mac.finalize().into_bytes();

    let mut mac = Hmac::<Sha256>::new_from_slice(&secret_key).unwrap();
    mac.update(check_string.as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    format!(
        "query_id=AAH&user={}&auth_date={auth_date}&hash={hash}",
        urlencoding::encode(&user)
    )
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub bot: Arc<RecordingBot>,
    pub service: TributeService,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let bot = Arc::new(RecordingBot::default());
        let clock = Arc::new(FixedClock(now()));

        let repos = Repositories {
            users: store.clone(),
            channels: store.clone(),
            subscriptions: store.clone(),
            payments: store.clone(),
        };
        let service = TributeService::new(repos, bot.clone(), Arc::new(MockPayoutGateway), clock.clone());

        let state = AppState {
            service: service.clone(),
            validator: Arc::new(InitDataValidator::new(
                &SecretString::from(BOT_TOKEN.to_string()),
                Duration::from_secs(24 * 60 * 60),
            )),
            clock,
            infra: Arc::new(MockInfrastructure::default()),
            webhook_secret: Arc::new(SecretString::from(WEBHOOK_SECRET.to_string())),
            admin_chat_id: ADMIN_CHAT_ID,
        };

        Self {
            store,
            bot,
            service,
            router: router(state),
        }
    }

    pub fn with_user(self, user: User) -> Self {
        self.store.insert_user(user);
        self
    }

    /// Adds a channel owned by `user_id` and returns it.
    pub fn add_channel(&self, user_id: i64, username: &str, is_verified: bool) -> Channel {
        let channel = Channel {
            id: Uuid::new_v4(),
            user_id,
            channel_title: format!("{username} title"),
            channel_username: username.to_string(),
            is_verified,
        };
        self.store.insert_channel(channel.clone());
        channel
    }

    pub fn add_tier(&self, channel: &Channel, price: f64) -> Subscription {
        let subscription = Subscription {
            id: Uuid::new_v4(),
            channel_id: channel.id,
            user_id: channel.user_id,
            channel_username: channel.channel_username.clone(),
            title: "Gold".to_string(),
            description: "All posts".to_string(),
            button_text: "Join".to_string(),
            price,
            created_date: now(),
        };
        self.store.insert_subscription(subscription.clone());
        subscription
    }

    /// Sends a request and returns the status and the JSON body (`Null` if empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<String>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let extra = authorization.map(|value| (header::AUTHORIZATION.as_str(), value));
        self.send(method, uri, extra, body).await
    }

    /// Delivers a Telegram update to the webhook with `secret` as the secret token.
    pub async fn webhook(&self, secret: Option<&str>, update: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let extra = secret.map(|value| (WEBHOOK_SECRET_HEADER, value.to_string()));
        self.send(Method::POST, "/api/v1/check-verified-passport", extra, Some(update))
            .await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        extra_header: Option<(&str, String)>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((name, value)) = extra_header {
            builder = builder.header(name, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Authenticated request as `user_id`.
    pub async fn request_as(
        &self,
        user_id: i64,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let authorization = format!("TgAuth {}", sign_init_data(user_id, AUTH_DATE));
        self.request(method, uri, Some(authorization), body).await
    }
}

/// A verified, onboarded user.
pub fn verified_user(id: i64) -> User {
    User {
        is_verified: true,
        ..User::onboarded(id)
    }
}
