//! [`ChannelProvider`] backed by a real guild.

use crate::{
    core::provisioning::ChannelProvider,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;

/// Channel access for one guild through the HTTP client.
#[derive(Debug, Clone, Copy)]
pub struct GuildChannels<'a> {
    http: &'a serenity::Http,
    guild_id: serenity::GuildId,
}

impl<'a> GuildChannels<'a> {
    /// Wraps `guild_id`.
    #[must_use]
    pub const fn new(http: &'a serenity::Http, guild_id: serenity::GuildId) -> Self {
        Self { http, guild_id }
    }

    async fn create(&self, builder: serenity::CreateChannel<'_>, name: &str) -> Result<u64> {
        let channel = self
            .guild_id
            .create_channel(self.http, builder)
            .await
            .map_err(|e| Error::Provisioning {
                message: format!("Failed to create '{name}': {e}"),
            })?;
        Ok(channel.id.get())
    }
}

impl ChannelProvider for GuildChannels<'_> {
    async fn existing_channel_ids(&self) -> Result<HashSet<u64>> {
        let channels = self.guild_id.channels(self.http).await?;
        Ok(channels.keys().map(|id| id.get()).collect())
    }

    async fn create_category(&self, name: &str) -> Result<u64> {
        let builder = serenity::CreateChannel::new(name).kind(serenity::ChannelType::Category);
        self.create(builder, name).await
    }

    async fn create_text_channel(&self, name: &str, parent: Option<u64>) -> Result<u64> {
        let mut builder = serenity::CreateChannel::new(name).kind(serenity::ChannelType::Text);
        if let Some(parent) = parent {
            builder = builder.category(serenity::ChannelId::new(parent));
        }
        self.create(builder, name).await
    }
}
