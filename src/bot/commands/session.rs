//! Session commands - personal access tokens for homelab services.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context,
            render::{info_embed, success_embed},
        },
        core::{sessions, users},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;

    async fn reply_private(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<()> {
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Manage your access token.
    #[poise::command(
        slash_command,
        subcommands("session_start", "session_show", "session_revoke"),
        subcommand_required
    )]
    pub async fn session(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Issues a new token, revoking the previous one.
    #[poise::command(slash_command, rename = "start")]
    pub async fn session_start(ctx: Context<'_>) -> Result<()> {
        let data = ctx.data();
        let author = ctx.author();
        let owner = users::touch_user(&data.database, &author.id.to_string(), &author.name).await?;

        let ttl = data
            .settings
            .bot
            .session_ttl()
            .ok_or_else(|| Error::validation("Session lifetime is out of range"))?;
        let (session, token) =
            sessions::create_session(&data.database, &data.cipher, &owner, ttl).await?;

        reply_private(
            ctx,
            success_embed(format!(
                "🔐 Your token: `{token}`\nExpires {}. Starting a new session revokes this one.",
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            )),
        )
        .await
    }

    /// Shows your current token.
    #[poise::command(slash_command, rename = "show")]
    pub async fn session_show(ctx: Context<'_>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let not_found = || Error::SessionNotFound {
            user_id: user_id.clone(),
        };

        let owner = users::get_user(&data.database, &user_id)
            .await?
            .ok_or_else(not_found)?;
        let active = sessions::active_session(&data.database, owner.id, Utc::now())
            .await?
            .ok_or_else(not_found)?;
        let token = sessions::reveal_token(&data.cipher, &active)?;

        reply_private(
            ctx,
            info_embed(format!(
                "🔐 Your token: `{token}`\nExpires {}.",
                active.expires_at.format("%Y-%m-%d %H:%M UTC")
            )),
        )
        .await
    }

    /// Revokes your token.
    #[poise::command(slash_command, rename = "revoke")]
    pub async fn session_revoke(ctx: Context<'_>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let revoked = match users::get_user(&data.database, &user_id).await? {
            Some(owner) => {
                sessions::revoke_sessions(&data.database, owner.id, Utc::now()).await?
            }
            None => 0,
        };

        let message = if revoked == 0 {
            "You have no active session.".to_string()
        } else {
            "🔒 Your session was revoked.".to_string()
        };
        reply_private(ctx, success_embed(message)).await
    }
}

// Re-export all commands
pub use inner::*;
