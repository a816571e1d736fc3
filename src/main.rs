#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use homelab_bot::{
    bot::{self, BotData},
    config::{database, settings},
    core::encryption::TokenCipher,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load and validate config.toml
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(
        "Loaded settings: {} service(s), {} game server(s)",
        settings.monitoring.services.len(),
        settings.game_servers.len()
    );

    // 4. Connect to the database and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Session token cipher
    let passphrase = env::var("BOT_ENCRYPTION_KEY")
        .inspect_err(|e| error!("BOT_ENCRYPTION_KEY not found: {e}"))
        .map_err(Error::EnvVar)?;
    let cipher = TokenCipher::from_passphrase(&passphrase)?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, settings, cipher)).await
}
