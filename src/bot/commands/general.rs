//! General Discord commands - ping and help.
//! These commands don't require database operations and provide basic bot
//! functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, core::dashboard::controller::HELP_TEXT, errors::Result};
    use std::time::Instant;

    /// Responds with "Pong!" and the round-trip time to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        let started = Instant::now();
        let reply = ctx.say("Pong!").await?;
        let elapsed = started.elapsed().as_millis();
        reply
            .edit(ctx, poise::CreateReply::default().content(format!("Pong! ({elapsed} ms)")))
            .await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .content(HELP_TEXT)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
