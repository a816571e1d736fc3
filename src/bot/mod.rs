//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the homelab bot, including all slash
//! commands, interaction and event handlers, the dashboard refresh loop and bot context
//! management.

/// Global and per-command checks (rate limiting, admin gate)
pub mod checks;
/// Discord command implementations (general, dashboards, projects, monitoring, admin, sessions)
pub mod commands;
/// Posting, refreshing and removing dashboard messages
pub mod dashboards;
/// Framework error handling
pub mod error_handler;
/// Discord interaction handlers (autocomplete, buttons, gateway events)
pub mod handlers;
/// Guild channel access for provisioning
pub mod provisioner;
/// Background refresh loop
pub mod refresh;
/// Conversion of dashboard views into serenity builders
pub mod render;

use crate::{
    config::Settings,
    core::{dashboard::DashboardRegistry, encryption::TokenCipher, rate_limit::RateLimiter},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands, handlers and the refresh loop.
/// Cloning is cheap: everything is behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BotData {
    /// Database connection for all database operations
    pub database: Arc<DatabaseConnection>,
    /// Settings loaded from config.toml
    pub settings: Arc<Settings>,
    /// Per-user command rate limiter
    pub limiter: Arc<RateLimiter>,
    /// Where each dashboard is posted
    pub registry: Arc<DashboardRegistry>,
    /// Cipher for stored session tokens
    pub cipher: Arc<TokenCipher>,
}

impl BotData {
    /// Creates a new `BotData` with an empty registry and a limiter built from `settings`.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings, cipher: TokenCipher) -> Self {
        let limiter = RateLimiter::new(
            settings.rate_limit.max_commands,
            Duration::from_secs(settings.rate_limit.window_secs),
        );
        Self {
            database: Arc::new(database),
            settings: Arc::new(settings),
            limiter: Arc::new(limiter),
            registry: Arc::new(DashboardRegistry::new()),
            cipher: Arc::new(cipher),
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::dashboard(),
        commands::project(),
        commands::task(),
        commands::status(),
        commands::services(),
        commands::gameservers(),
        commands::alerts(),
        commands::resolve_alert(),
        commands::setup(),
        commands::audit(),
        commands::ratelimits(),
        commands::admin(),
        commands::session(),
    ]
}

/// Builds the poise framework and runs the client until it shuts down.
///
/// The setup hook registers the slash commands globally, loads the dashboard
/// registry and spawns the refresh loop.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            command_check: Some(|ctx| Box::pin(checks::global_check(ctx))),
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = error_handler::handle(error).await {
                        tracing::error!("Error while handling error: {e}");
                    }
                })
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::events::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                data.registry.hydrate(&data.database).await?;
                tokio::spawn(refresh::refresh_loop(Arc::clone(&ctx.http), data.clone()));
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT; // prefix commands

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users;
    use crate::test_utils::{setup_test_db, test_cipher};

    #[tokio::test]
    async fn test_bot_data_clones_share_state() -> Result<()> {
        let db = setup_test_db().await?;
        let data = BotData::new(db, Settings::default(), test_cipher());
        let clone = data.clone();

        assert!(Arc::ptr_eq(&data.database, &clone.database));
        assert!(Arc::ptr_eq(&data.registry, &clone.registry));
        users::touch_user(&clone.database, "1", "alice").await?;
        assert_eq!(users::count_users(&data.database).await?, 1);
        Ok(())
    }
}
