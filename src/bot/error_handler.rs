//! Framework error handling.
//!
//! User mistakes (validation failures, unknown names) are shown to the caller as-is.
//! Everything else is logged and replaced with a generic message.

use super::{BotData, render::failure_embed};
use crate::errors::{Error, Result};
use poise::{CreateReply, FrameworkError};
use tracing::{error, warn};

async fn reply_failure(ctx: super::Context<'_>, message: impl Into<String>) -> Result<()> {
    ctx.send(
        CreateReply::default()
            .embed(failure_embed(message))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Handles every error poise reports.
pub async fn handle(error: FrameworkError<'_, BotData, Error>) -> Result<()> {
    match error {
        FrameworkError::Setup { error, .. } => {
            error!("Error in user data setup: {error}");
        }
        FrameworkError::EventHandler { error, event, .. } => error!(
            "Event handler encountered an error on {} event: {error}",
            event.snake_case_name(),
        ),
        FrameworkError::Command { ctx, error, .. } => {
            let message = if error.is_user_error() {
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
                "An unexpected error occurred. The details have been logged.".to_string()
            };
            reply_failure(ctx, message).await?;
        }
        FrameworkError::SubcommandRequired { ctx } => {
            let subcommands = ctx
                .command()
                .subcommands
                .iter()
                .map(|s| &*s.name)
                .collect::<Vec<_>>();
            reply_failure(
                ctx,
                format!(
                    "You must specify one of the following subcommands: {}",
                    subcommands.join(", ")
                ),
            )
            .await?;
        }
        FrameworkError::CommandPanic { ctx, payload, .. } => {
            error!(
                "Command {} panicked with payload: {:?}",
                ctx.command().name,
                payload
            );
            reply_failure(ctx, "An unexpected internal error has occurred.").await?;
        }
        FrameworkError::ArgumentParse {
            ctx, input, error, ..
        } => {
            let response = input.map_or_else(
                || format!("**{error}**"),
                |input| format!("**Cannot parse `{input}` as argument: {error}**"),
            );
            reply_failure(ctx, response).await?;
        }
        FrameworkError::CommandCheckFailed { ctx, error, .. } => {
            // A check that returned Ok(false) already told the user why
            if let Some(error) = error {
                error!(
                    "Command check failed in command {} for user {}: {error}",
                    ctx.command().name,
                    ctx.author().name,
                );
                reply_failure(ctx, "Could not verify your permissions, try again later.").await?;
            }
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let response = missing_permissions.map_or_else(
                || format!("You may be lacking permissions for `/{}`.", ctx.command().name),
                |missing| {
                    format!(
                        "You're lacking permissions for `/{}`: {missing}",
                        ctx.command().name
                    )
                },
            );
            reply_failure(ctx, response).await?;
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            reply_failure(ctx, "You cannot run this command in DMs.").await?;
        }
        FrameworkError::UnknownInteraction { interaction, .. } => {
            warn!("Received unknown interaction \"{}\"", interaction.data.name);
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
    Ok(())
}
