//! Telegram Mini App authentication

pub mod clock;
pub mod init_data;

pub use clock::{Clock, FixedClock, SystemClock};
pub use init_data::{AuthenticatedPrincipal, InitDataError, InitDataValidator, DEFAULT_MAX_AGE};
