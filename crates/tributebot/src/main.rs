use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use tokio::signal;

use tributebot::api::{self, AppState, ServerInfrastructure};
use tributebot::cli::{Cli, Commands};
use tributebot::service::{Repositories, TributeService};
use tributebot::telegram::TeloxideGateway;
use tributecore::auth::{Clock, SystemClock};
use tributecore::cache::RedisCache;
use tributecore::payouts::MockPayoutGateway;
use tributecore::{logging, storage, Config, InitDataValidator};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the selected subcommand; `run` is
/// the default.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    logging::init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Migrate => {
            let pool = storage::connect(&config.database)
                .await
                .context("Failed to connect to database")?;
            storage::migrate(&pool).await?;
            Ok(())
        }
        Commands::SignInitData {
            user_id,
            first_name,
            username,
            auth_date,
        } => {
            let validator = InitDataValidator::new(&config.bot_token, config.init_data_max_age);
            let user = serde_json::json!({
                "id": user_id,
                "first_name": first_name,
                "username": username,
            })
            .to_string();
            let auth_date = auth_date.unwrap_or_else(|| Utc::now().timestamp()).to_string();

            println!("{}", validator.sign(&[("auth_date", &auth_date), ("user", &user)]));
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> Result<()> {
    tracing::info!(
        database = %config.database_url_redacted(),
        port = config.port,
        redis = config.redis_enabled(),
        "Starting Tribute backend"
    );

    let pool = storage::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    storage::migrate(&pool).await?;

    let cache = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, continuing without cache");
                None
            }
        },
        None => {
            tracing::info!("Redis disabled");
            None
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = TributeService::new(
        Repositories::postgres(pool.clone()),
        Arc::new(TeloxideGateway::new(&config.bot_token, config.admin_chat_id)),
        Arc::new(MockPayoutGateway),
        Arc::clone(&clock),
    );

    let state = AppState {
        service,
        validator: Arc::new(InitDataValidator::new(&config.bot_token, config.init_data_max_age)),
        clock,
        infra: Arc::new(ServerInfrastructure::new(pool, cache)),
        webhook_secret: Arc::new(config.webhook_secret.clone()),
        admin_chat_id: config.admin_chat_id,
    };

    api::serve(api::router(state), config.port, shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}
