//! Dashboard commands - create, refresh, remove, list and configure dashboard messages.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context, dashboards,
            handlers::autocomplete,
            render::{info_embed, success_embed},
        },
        core::{
            audit,
            dashboard::{DashboardKind, repository},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn guild_id(ctx: Context<'_>) -> Result<serenity::GuildId> {
        ctx.guild_id()
            .ok_or_else(|| Error::validation("This command only works inside a server."))
    }

    async fn reply_success(ctx: Context<'_>, message: impl Into<String>) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .embed(success_embed(message))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Manage live dashboards.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands(
            "dashboard_create",
            "dashboard_refresh",
            "dashboard_remove",
            "dashboard_list",
            "dashboard_button"
        ),
        subcommand_required
    )]
    pub async fn dashboard(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Posts a dashboard in a channel (defaults to this one), replacing any previous post.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "create",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn dashboard_create(
        ctx: Context<'_>,
        #[description = "Dashboard kind"]
        #[autocomplete = "autocomplete::autocomplete_dashboard_kind"]
        kind: String,
        #[description = "Channel to post in"] channel: Option<serenity::GuildChannel>,
    ) -> Result<()> {
        let kind: DashboardKind = kind.parse()?;
        let guild = guild_id(ctx)?.to_string();
        let channel_id = channel.map_or_else(|| ctx.channel_id(), |c| c.id);
        ctx.defer_ephemeral().await?;

        let data = ctx.data();
        dashboards::post_dashboard(ctx.http(), data, &guild, kind, channel_id).await?;
        audit::log_action(
            &data.database,
            Some(&guild),
            &ctx.author().id.to_string(),
            "dashboard_create",
            format!("{kind} in <#{channel_id}>"),
        )
        .await?;

        reply_success(ctx, format!("✅ Posted the {kind} dashboard in <#{channel_id}>.")).await
    }

    /// Re-renders one dashboard, or every dashboard of this server.
    #[poise::command(slash_command, guild_only, rename = "refresh")]
    pub async fn dashboard_refresh(
        ctx: Context<'_>,
        #[description = "Dashboard kind (all if omitted)"]
        #[autocomplete = "autocomplete::autocomplete_dashboard_kind"]
        kind: Option<String>,
    ) -> Result<()> {
        let guild = guild_id(ctx)?.to_string();
        let kinds = match kind {
            Some(kind) => vec![kind.parse::<DashboardKind>()?],
            None => DashboardKind::ALL.to_vec(),
        };
        ctx.defer_ephemeral().await?;

        let data = ctx.data();
        let mut refreshed = 0;
        for kind in kinds {
            let Some(location) = data.registry.get(&guild, kind) else {
                continue;
            };
            dashboards::refresh_dashboard(ctx.http(), data, &guild, kind, location).await?;
            refreshed += 1;
        }

        if refreshed == 0 {
            return Err(Error::validation(
                "No matching dashboard is posted. Use `/dashboard create` first.",
            ));
        }
        reply_success(ctx, format!("🔄 Refreshed {refreshed} dashboard(s).")).await
    }

    /// Deletes a dashboard message and stops refreshing it.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "remove",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn dashboard_remove(
        ctx: Context<'_>,
        #[description = "Dashboard kind"]
        #[autocomplete = "autocomplete::autocomplete_dashboard_kind"]
        kind: String,
    ) -> Result<()> {
        let kind: DashboardKind = kind.parse()?;
        let guild = guild_id(ctx)?.to_string();
        let data = ctx.data();

        let had_message = dashboards::remove_dashboard(ctx.http(), data, &guild, kind).await?;
        audit::log_action(
            &data.database,
            Some(&guild),
            &ctx.author().id.to_string(),
            "dashboard_remove",
            kind.to_string(),
        )
        .await?;

        let message = if had_message {
            format!("🗑️ Removed the {kind} dashboard.")
        } else {
            format!("The {kind} dashboard was not posted; it is now disabled.")
        };
        reply_success(ctx, message).await
    }

    /// Lists this server's dashboards and where they are posted.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn dashboard_list(ctx: Context<'_>) -> Result<()> {
        let guild = guild_id(ctx)?.to_string();
        let data = ctx.data();
        let all = repository::list_dashboards(&data.database, &guild).await?;

        if all.is_empty() {
            ctx.say("📋 No dashboards yet. Create one with `/dashboard create`.")
                .await?;
            return Ok(());
        }

        let mut response = String::new();
        for record in all {
            let location = record
                .kind
                .parse::<DashboardKind>()
                .ok()
                .and_then(|kind| data.registry.get(&guild, kind));
            let state = match (record.is_active, location) {
                (true, Some(location)) => format!("posted in <#{}>", location.channel_id),
                (true, None) => "not posted".to_string(),
                (false, _) => "disabled".to_string(),
            };
            writeln!(&mut response, "• **{}** - {state}", record.kind)?;
        }

        ctx.send(
            poise::CreateReply::default()
                .embed(info_embed(response).title("📋 Dashboards")),
        )
        .await?;
        Ok(())
    }

    /// Shows or hides a button on a dashboard.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "button",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn dashboard_button(
        ctx: Context<'_>,
        #[description = "Dashboard kind"]
        #[autocomplete = "autocomplete::autocomplete_dashboard_kind"]
        kind: String,
        #[description = "Button action"]
        #[autocomplete = "autocomplete::autocomplete_dashboard_action"]
        action: String,
        #[description = "Whether the button is shown"] enabled: bool,
    ) -> Result<()> {
        let kind: DashboardKind = kind.parse()?;
        let guild = guild_id(ctx)?.to_string();
        let data = ctx.data();

        let record = match repository::get_dashboard(&data.database, &guild, kind).await? {
            Some(record) => record,
            None => repository::ensure_dashboard(&data.database, &guild, kind).await?,
        };
        repository::set_component_enabled(&data.database, record.id, &action, enabled).await?;
        audit::log_action(
            &data.database,
            Some(&guild),
            &ctx.author().id.to_string(),
            "dashboard_button",
            format!("{kind}:{action} enabled={enabled}"),
        )
        .await?;

        dashboards::refresh_if_posted(ctx.http(), data, &guild, kind).await;
        let verb = if enabled { "shown" } else { "hidden" };
        reply_success(ctx, format!("The `{action}` button on the {kind} dashboard is now {verb}."))
            .await
    }
}

// Re-export all commands
pub use inner::*;
