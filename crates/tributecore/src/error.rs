use thiserror::Error;

/// Centralized error type for the core library
///
/// Storage and cache failures surface through this enum so the service layer
/// has a single `#[from]` conversion to care about.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis errors
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
