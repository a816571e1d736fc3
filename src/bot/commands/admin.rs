//! Admin commands - server setup, audit log, rate limit ledger and bot admins.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context, dashboards,
            provisioner::GuildChannels,
            render::{info_embed, success_embed},
        },
        core::{audit, dashboard::DashboardKind, provisioning, rate_limit, users},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::{info, warn};

    const DEFAULT_AUDIT_LIMIT: u64 = 10;
    const MAX_AUDIT_LIMIT: u64 = 50;
    const OFFENDER_LIMIT: u64 = 10;

    fn guild_id(ctx: Context<'_>) -> Result<serenity::GuildId> {
        ctx.guild_id()
            .ok_or_else(|| Error::validation("This command only works inside a server."))
    }

    /// Creates the homelab category and channels, then posts any missing dashboards.
    #[poise::command(
        slash_command,
        guild_only,
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn setup(ctx: Context<'_>) -> Result<()> {
        let guild_id = guild_id(ctx)?;
        let guild = guild_id.to_string();
        ctx.defer_ephemeral().await?;

        let data = ctx.data();
        let provider = GuildChannels::new(ctx.http(), guild_id);
        let report =
            provisioning::provision_layout(&data.database, &provider, &guild, &data.settings)
                .await?;

        let mut posted = Vec::new();
        for kind in DashboardKind::ALL {
            if data.registry.get(&guild, kind).is_some() {
                continue;
            }
            let channel_name = data.settings.channel_for(kind);
            let Some((_, channel)) = report
                .channels
                .iter()
                .find(|(name, _)| name == channel_name)
            else {
                warn!("No provisioned channel '{channel_name}' for the {kind} dashboard");
                continue;
            };
            dashboards::post_dashboard(
                ctx.http(),
                data,
                &guild,
                kind,
                serenity::ChannelId::new(channel.id),
            )
            .await?;
            posted.push(kind.to_string());
        }

        let created = report.created_count();
        info!("Setup in guild {guild}: {created} channel(s) created, {} dashboard(s) posted", posted.len());
        audit::log_action(
            &data.database,
            Some(&guild),
            &ctx.author().id.to_string(),
            "setup",
            format!("{created} created, posted [{}]", posted.join(", ")),
        )
        .await?;

        let mut response = format!("🏗️ Setup complete. Created {created} channel(s).\n");
        for (name, channel) in &report.channels {
            let marker = if channel.created { "🆕" } else { "✔️" };
            writeln!(&mut response, "{marker} <#{}> ({name})", channel.id)?;
        }
        if posted.is_empty() {
            response.push_str("All dashboards were already posted.");
        } else {
            write!(&mut response, "Posted dashboards: {}", posted.join(", "))?;
        }

        ctx.send(
            poise::CreateReply::default()
                .embed(success_embed(response))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Shows recent administrative actions in this server.
    #[poise::command(
        slash_command,
        guild_only,
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn audit(
        ctx: Context<'_>,
        #[description = "Number of entries (default 10, max 50)"] limit: Option<u64>,
    ) -> Result<()> {
        let guild = guild_id(ctx)?.to_string();
        let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
        let entries = audit::recent_entries(&ctx.data().database, &guild, limit).await?;

        let mut response = String::from("📜 **Audit log**\n\n");
        if entries.is_empty() {
            response.push_str("_Nothing recorded yet._");
        }
        for entry in &entries {
            let actor = if entry.actor_id == audit::SYSTEM_ACTOR {
                "system".to_string()
            } else {
                format!("<@{}>", entry.actor_id)
            };
            writeln!(
                &mut response,
                "`{}` {actor} **{}** {}",
                entry.created_at.format("%m-%d %H:%M"),
                entry.action,
                entry.details
            )?;
        }

        ctx.send(
            poise::CreateReply::default()
                .embed(info_embed(response))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Lists the users who hit the rate limit most often.
    #[poise::command(
        slash_command,
        guild_only,
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn ratelimits(ctx: Context<'_>) -> Result<()> {
        let guild_id = guild_id(ctx)?.to_string();
        let offenders =
            rate_limit::top_offenders(&ctx.data().database, &guild_id, OFFENDER_LIMIT).await?;

        let mut response = String::from("⏱️ **Rate limited users**\n\n");
        if offenders.is_empty() {
            response.push_str("_Nobody has been rate limited._");
        }
        for row in &offenders {
            writeln!(
                &mut response,
                "<@{}> {} hit(s) on `{}`, last {}",
                row.user_id,
                row.hits,
                row.bucket,
                row.last_limited_at.format("%Y-%m-%d %H:%M UTC")
            )?;
        }

        ctx.send(
            poise::CreateReply::default()
                .embed(info_embed(response))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Manage bot admins.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("admin_grant", "admin_revoke"),
        subcommand_required
    )]
    pub async fn admin(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    async fn set_admin_flag(ctx: Context<'_>, user: &serenity::User, grant: bool) -> Result<()> {
        let data = ctx.data();
        let user_id = user.id.to_string();
        let actor_id = ctx.author().id.to_string();
        let guild = guild_id(ctx)?.to_string();

        users::touch_user(&data.database, &user_id, &user.name).await?;
        let changed = users::set_admin(&data.database, &guild, &user_id, grant, &actor_id).await?;

        if changed {
            let action = if grant { "admin_grant" } else { "admin_revoke" };
            audit::log_action(
                &data.database,
                Some(guild.as_str()),
                &actor_id,
                action,
                format!("<@{user_id}>"),
            )
            .await?;
        }

        let message = match (grant, changed) {
            (true, true) => format!("🔑 {} is now a bot admin in this server.", user.name),
            (true, false) => format!("{} is already a bot admin in this server.", user.name),
            (false, true) => format!("🔒 {} is no longer a bot admin in this server.", user.name),
            (false, false) => format!("{} was not a bot admin in this server.", user.name),
        };
        ctx.send(
            poise::CreateReply::default()
                .embed(success_embed(message))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Lets a user run admin commands in this server.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "grant",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn admin_grant(
        ctx: Context<'_>,
        #[description = "User to promote"] user: serenity::User,
    ) -> Result<()> {
        set_admin_flag(ctx, &user, true).await
    }

    /// Removes a user's bot admin rights in this server.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "revoke",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn admin_revoke(
        ctx: Context<'_>,
        #[description = "User to demote"] user: serenity::User,
    ) -> Result<()> {
        set_admin_flag(ctx, &user, false).await
    }
}

// Re-export all commands
pub use inner::*;
