//! Gateway event dispatch: member joins and component interactions.

use super::interactions;
use crate::{
    bot::{BotData, dashboards},
    core::{audit, dashboard::DashboardKind, provisioning, users},
    errors::{Error, Result},
};
use poise::serenity_prelude::{self as serenity, Mentionable};
use tracing::{debug, info};

/// Entry point for every gateway event poise forwards.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            welcome_member(ctx, data, new_member).await
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => interactions::handle_component(ctx, data, component).await,
        _ => Ok(()),
    }
}

/// Greets a new member in the welcome channel and refreshes the welcome dashboard.
async fn welcome_member(
    ctx: &serenity::Context,
    data: &BotData,
    member: &serenity::Member,
) -> Result<()> {
    let db = &data.database;
    let guild_id = member.guild_id.to_string();
    let user = &member.user;
    info!("{} joined guild {guild_id}", user.name);

    users::touch_user(db, &user.id.to_string(), &user.name).await?;
    audit::log_action(
        db,
        Some(&guild_id),
        audit::SYSTEM_ACTOR,
        "member_join",
        format!("{} ({})", user.name, user.id),
    )
    .await?;

    let welcome_channel = &data.settings.provisioning.welcome_channel;
    let Some(mapping) = provisioning::get_channel_mapping(db, &guild_id, welcome_channel).await?
    else {
        debug!("No #{welcome_channel} channel provisioned in guild {guild_id}, skipping greeting");
        return Ok(());
    };

    let channel_id = mapping.channel_id.parse::<u64>().map_err(|e| Error::Provisioning {
        message: format!("Invalid channel ID '{}': {e}", mapping.channel_id),
    })?;
    let greeting = data.settings.welcome.render_message(&user.id.mention().to_string());
    serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().content(greeting))
        .await?;

    dashboards::refresh_if_posted(&ctx.http, data, &guild_id, DashboardKind::Welcome).await;
    Ok(())
}
