use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tributebot")]
#[command(author, version, about = "Backend for the Tribute Telegram Mini App", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Run,

    /// Apply database migrations and exit
    Migrate,

    /// Print a signed initData string for the configured bot token
    SignInitData {
        /// Telegram user id to embed
        #[arg(long)]
        user_id: i64,

        #[arg(long, default_value = "Test")]
        first_name: String,

        #[arg(long)]
        username: Option<String>,

        /// Unix timestamp for auth_date (defaults to now)
        #[arg(long)]
        auth_date: Option<i64>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
