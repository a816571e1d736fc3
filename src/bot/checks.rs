//! Command checks.
//!
//! [`global_check`] runs before every command: it records the caller in the users
//! table and applies the per-user rate limit. [`admin_check`] gates administrative
//! commands behind either the Discord Administrator permission or the bot-level
//! admin grant made with `/admin grant` in the same guild.

use super::{Context, render::failure_embed};
use crate::{
    core::{
        rate_limit::{self, COMMAND_BUCKET, RateDecision},
        users,
    },
    errors::Result,
};
use chrono::Utc;
use poise::CreateReply;
use tracing::{debug, warn};

/// Rate limit plus user bookkeeping, run before every command.
pub async fn global_check(ctx: Context<'_>) -> Result<bool> {
    let data = ctx.data();
    let author = ctx.author();
    let user_id = author.id.to_string();
    let guild_id = ctx.guild_id().map(|g| g.to_string());

    users::touch_user(&data.database, &user_id, &author.name).await?;

    match data.limiter.check(&user_id) {
        RateDecision::Allowed { remaining } => {
            debug!("{} ran /{} ({remaining} left)", author.name, ctx.command().name);
            Ok(true)
        }
        RateDecision::Limited { retry_after } => {
            warn!("Rate limited {} ({user_id})", author.name);
            let recorded = rate_limit::record_limited(
                &data.database,
                guild_id.as_deref(),
                &user_id,
                COMMAND_BUCKET,
                Utc::now(),
            )
            .await;
            if let Err(e) = recorded {
                warn!("Could not record rate limit hit: {e}");
            }
            let message = format!(
                "You're sending commands too fast. Try again in {} seconds.",
                retry_after.as_secs().max(1)
            );
            ctx.send(
                CreateReply::default()
                    .embed(failure_embed(message))
                    .ephemeral(true),
            )
            .await?;
            Ok(false)
        }
    }
}

/// Whether the caller may run administrative commands in the current guild.
///
/// Outside a guild nobody is an admin.
pub async fn is_admin(ctx: Context<'_>) -> Result<bool> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };

    let has_permission = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator());
    if has_permission {
        return Ok(true);
    }

    users::is_admin(
        &ctx.data().database,
        &guild_id.to_string(),
        &ctx.author().id.to_string(),
    )
    .await
}

/// Per-command check for administrative commands.
pub async fn admin_check(ctx: Context<'_>) -> Result<bool> {
    if is_admin(ctx).await? {
        return Ok(true);
    }
    ctx.send(
        CreateReply::default()
            .embed(failure_embed("Only server administrators can use this command."))
            .ephemeral(true),
    )
    .await?;
    Ok(false)
}
