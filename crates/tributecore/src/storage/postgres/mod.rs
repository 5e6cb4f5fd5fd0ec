//! PostgreSQL repositories (sqlx, runtime-checked queries)

mod channels;
mod payments;
mod subscriptions;
mod users;

pub use channels::PgChannelRepository;
pub use payments::PgPaymentRepository;
pub use subscriptions::PgSubscriptionRepository;
pub use users::PgUserRepository;
