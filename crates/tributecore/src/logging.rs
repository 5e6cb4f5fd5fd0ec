//! Logging initialization
//!
//! `tracing` is the logging facade for the whole workspace. Dependencies that
//! still emit through `log` (teloxide, sqlx) are bridged with `tracing-log`.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,tower_http=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records: {0}")]
    LogBridge(#[from] tracing_log::log_tracer::SetLoggerError),
}

/// Builds the `EnvFilter` from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the global subscriber (console output, `RUST_LOG` filtering)
///
/// # Errors
/// Fails if a global subscriber or `log` logger was already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    let subscriber = Registry::default()
        .with(env_filter())
        .with(fmt::layer().with_target(true));

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}
