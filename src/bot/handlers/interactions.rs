//! Dashboard button clicks.
//!
//! Buttons carry a `dash:<kind>:<action>` custom ID. Clicks on anything else are
//! ignored so other components can coexist.

use crate::{
    bot::{BotData, render},
    core::{
        dashboard::{self, ActionResponse, ButtonAction},
        rate_limit::{self, BUTTON_BUCKET, RateDecision},
        users,
    },
    errors::Result,
};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

async fn reply_ephemeral(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    content: impl Into<String>,
) -> Result<()> {
    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Answers a button click on a dashboard.
pub async fn handle_component(
    ctx: &serenity::Context,
    data: &BotData,
    component: &serenity::ComponentInteraction,
) -> Result<()> {
    let Some(action) = ButtonAction::parse(&component.data.custom_id) else {
        return Ok(());
    };
    let Some(guild_id) = component.guild_id else {
        return reply_ephemeral(ctx, component, "Dashboards only work inside a server.").await;
    };

    let user_id = component.user.id.to_string();
    let guild = guild_id.to_string();
    if let RateDecision::Limited { retry_after } = data.limiter.check(&user_id) {
        let recorded = rate_limit::record_limited(
            &data.database,
            Some(guild.as_str()),
            &user_id,
            BUTTON_BUCKET,
            Utc::now(),
        )
        .await;
        if let Err(e) = recorded {
            warn!("Could not record rate limit hit: {e}");
        }
        let message = format!(
            "Slow down! Try again in {} seconds.",
            retry_after.as_secs().max(1)
        );
        return reply_ephemeral(ctx, component, message).await;
    }
    users::touch_user(&data.database, &user_id, &component.user.name).await?;

    debug!("{} clicked {action}", component.user.name);
    let response =
        match dashboard::handle_action(&data.database, &data.settings, &guild, &action).await {
            Ok(response) => response,
            Err(e) => {
                reply_ephemeral(ctx, component, "Something went wrong, try again later.").await?;
                return Err(e);
            }
        };

    match response {
        ActionResponse::Refresh(view) => {
            component
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(render::dashboard_embed(&view))
                            .components(render::dashboard_components(&view)),
                    ),
                )
                .await?;
        }
        ActionResponse::Ephemeral(text) => reply_ephemeral(ctx, component, text).await?,
    }
    Ok(())
}
