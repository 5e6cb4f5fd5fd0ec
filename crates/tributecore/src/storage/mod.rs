//! Persistence: repository traits and their PostgreSQL implementations

pub mod postgres;
pub mod repositories;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::AppResult;

pub use postgres::{PgChannelRepository, PgPaymentRepository, PgSubscriptionRepository, PgUserRepository};
pub use repositories::{ChannelRepository, PaymentRepository, SubscriptionRepository, UserRepository};

/// Create the PostgreSQL connection pool
///
/// The pool is verified with one connection before returning, so a bad
/// `DATABASE_URL` fails at startup rather than on the first request.
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(config.url.expose_secret())
        .await?;

    tracing::info!(max_connections = config.max_connections, "Database connected");
    Ok(pool)
}

/// Apply the embedded migrations in `crates/tributecore/migrations`.
pub async fn migrate(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}

/// `SELECT 1` round trip, used by the health endpoint.
pub async fn ping(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    }
}
