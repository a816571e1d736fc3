//! Channel and category provisioning.
//!
//! Channels are created only when missing. The mapping tables remember which live
//! Discord IDs belong to which logical names, so a restart (or a second `/setup`)
//! reuses existing channels instead of piling up duplicates. If a mapped channel was
//! deleted by hand it is recreated and the mapping is repointed.
//!
//! Discord access goes through [`ChannelProvider`] so the logic here stays testable.

use crate::{
    config::Settings,
    core::dashboard::DashboardKind,
    entities::{CategoryMapping, ChannelMapping, category_mapping, channel_mapping},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashSet;
use std::future::Future;
use tracing::info;

/// Minimal guild channel API needed for provisioning.
pub trait ChannelProvider {
    /// IDs of every channel and category currently in the guild.
    fn existing_channel_ids(&self) -> impl Future<Output = Result<HashSet<u64>>> + Send;

    /// Creates a category and returns its ID.
    fn create_category(&self, name: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Creates a text channel under `parent` (if given) and returns its ID.
    fn create_text_channel(
        &self,
        name: &str,
        parent: Option<u64>,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Result of an ensure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    /// Live Discord ID
    pub id: u64,
    /// Whether the channel had to be created
    pub created: bool,
}

/// Everything `/setup` provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReport {
    /// The category holding the dashboard channels
    pub category: Provisioned,
    /// Each dashboard channel, by logical name
    pub channels: Vec<(String, Provisioned)>,
}

impl LayoutReport {
    /// Number of Discord objects that were newly created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        usize::from(self.category.created)
            + self.channels.iter().filter(|(_, p)| p.created).count()
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

/// Looks up the category mapping for `name`.
pub async fn get_category_mapping(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
) -> Result<Option<category_mapping::Model>> {
    CategoryMapping::find()
        .filter(category_mapping::Column::GuildId.eq(guild_id))
        .filter(category_mapping::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up the channel mapping for `name`.
pub async fn get_channel_mapping(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
) -> Result<Option<channel_mapping::Model>> {
    ChannelMapping::find()
        .filter(channel_mapping::Column::GuildId.eq(guild_id))
        .filter(channel_mapping::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All channel mappings of a guild, ordered by name.
pub async fn list_channel_mappings(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<channel_mapping::Model>> {
    ChannelMapping::find()
        .filter(channel_mapping::Column::GuildId.eq(guild_id))
        .order_by_asc(channel_mapping::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Makes sure a category called `name` exists, creating and mapping it if needed.
pub async fn ensure_category<P: ChannelProvider + Sync>(
    db: &DatabaseConnection,
    provider: &P,
    guild_id: &str,
    name: &str,
) -> Result<Provisioned> {
    let existing_ids = provider.existing_channel_ids().await?;
    ensure_category_with(db, provider, guild_id, name, &existing_ids).await
}

async fn ensure_category_with<P: ChannelProvider + Sync>(
    db: &DatabaseConnection,
    provider: &P,
    guild_id: &str,
    name: &str,
    existing_ids: &HashSet<u64>,
) -> Result<Provisioned> {
    let mapping = get_category_mapping(db, guild_id, name).await?;
    if let Some(id) = mapping
        .as_ref()
        .and_then(|m| parse_id(&m.category_id))
        .filter(|id| existing_ids.contains(id))
    {
        return Ok(Provisioned { id, created: false });
    }

    let id = provider.create_category(name).await?;
    info!("Created category '{name}' ({id}) in guild {guild_id}");

    let now = Utc::now();
    if let Some(existing) = mapping {
        let mut active_model: category_mapping::ActiveModel = existing.into();
        active_model.category_id = Set(id.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        category_mapping::ActiveModel {
            guild_id: Set(guild_id.to_string()),
            name: Set(name.to_string()),
            category_id: Set(id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(Provisioned { id, created: true })
}

/// Makes sure a text channel called `name` exists, creating and mapping it if needed.
pub async fn ensure_channel<P: ChannelProvider + Sync>(
    db: &DatabaseConnection,
    provider: &P,
    guild_id: &str,
    name: &str,
    category_id: Option<u64>,
) -> Result<Provisioned> {
    let existing_ids = provider.existing_channel_ids().await?;
    ensure_channel_with(db, provider, guild_id, name, category_id, &existing_ids).await
}

async fn ensure_channel_with<P: ChannelProvider + Sync>(
    db: &DatabaseConnection,
    provider: &P,
    guild_id: &str,
    name: &str,
    category_id: Option<u64>,
    existing_ids: &HashSet<u64>,
) -> Result<Provisioned> {
    let mapping = get_channel_mapping(db, guild_id, name).await?;
    if let Some(id) = mapping
        .as_ref()
        .and_then(|m| parse_id(&m.channel_id))
        .filter(|id| existing_ids.contains(id))
    {
        return Ok(Provisioned { id, created: false });
    }

    let id = provider.create_text_channel(name, category_id).await?;
    info!("Created channel '#{name}' ({id}) in guild {guild_id}");

    let now = Utc::now();
    let category = category_id.map(|c| c.to_string());
    if let Some(existing) = mapping {
        let mut active_model: channel_mapping::ActiveModel = existing.into();
        active_model.channel_id = Set(id.to_string());
        active_model.category_id = Set(category);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        channel_mapping::ActiveModel {
            guild_id: Set(guild_id.to_string()),
            name: Set(name.to_string()),
            channel_id: Set(id.to_string()),
            category_id: Set(category),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(Provisioned { id, created: true })
}

/// Ensures the configured category and one channel per dashboard kind.
///
/// The guild's channel list is fetched once and shared by every ensure call.
pub async fn provision_layout<P: ChannelProvider + Sync>(
    db: &DatabaseConnection,
    provider: &P,
    guild_id: &str,
    settings: &Settings,
) -> Result<LayoutReport> {
    let existing_ids = provider.existing_channel_ids().await?;
    let category = ensure_category_with(
        db,
        provider,
        guild_id,
        &settings.provisioning.category,
        &existing_ids,
    )
    .await?;

    let mut channels: Vec<(String, Provisioned)> = Vec::new();
    for kind in DashboardKind::ALL {
        let name = settings.channel_for(kind).to_string();
        // Two kinds may share a channel name
        if channels.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        let provisioned = ensure_channel_with(
            db,
            provider,
            guild_id,
            &name,
            Some(category.id),
            &existing_ids,
        )
        .await?;
        channels.push((name, provisioned));
    }

    Ok(LayoutReport { category, channels })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{FakeChannels, setup_test_db};

    #[tokio::test]
    async fn test_ensure_channel_creates_once() -> Result<()> {
        let db = setup_test_db().await?;
        let provider = FakeChannels::default();

        let first = ensure_channel(&db, &provider, "g1", "monitoring", None).await?;
        assert!(first.created);

        let second = ensure_channel(&db, &provider, "g1", "monitoring", None).await?;
        assert!(!second.created);
        assert_eq!(second.id, first.id);
        assert_eq!(provider.created_names(), vec!["monitoring"]);

        let mapping = get_channel_mapping(&db, "g1", "monitoring").await?.unwrap();
        assert_eq!(mapping.channel_id, first.id.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_channel_is_recreated_and_remapped() -> Result<()> {
        let db = setup_test_db().await?;
        let provider = FakeChannels::default();

        let first = ensure_channel(&db, &provider, "g1", "projects", Some(5)).await?;
        provider.delete(first.id);

        let second = ensure_channel(&db, &provider, "g1", "projects", Some(5)).await?;
        assert!(second.created);
        assert_ne!(second.id, first.id);

        let mappings = list_channel_mappings(&db, "g1").await?;
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].channel_id, second.id.to_string());
        assert_eq!(mappings[0].category_id.as_deref(), Some("5"));
        Ok(())
    }

    #[tokio::test]
    async fn test_mappings_are_per_guild() -> Result<()> {
        let db = setup_test_db().await?;
        let provider = FakeChannels::default();

        ensure_category(&db, &provider, "g1", "Homelab").await?;
        let other = ensure_category(&db, &provider, "g2", "Homelab").await?;
        assert!(other.created);
        assert!(get_category_mapping(&db, "g2", "Homelab").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_provision_layout_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let provider = FakeChannels::default();
        let settings = Settings::default();

        let first = provision_layout(&db, &provider, "g1", &settings).await?;
        assert!(first.category.created);
        assert_eq!(first.channels.len(), 4);
        assert_eq!(first.created_count(), 5);

        let second = provision_layout(&db, &provider, "g1", &settings).await?;
        assert_eq!(second.created_count(), 0);
        assert_eq!(second.category.id, first.category.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_provision_layout_dedupes_shared_channel_names() -> Result<()> {
        let db = setup_test_db().await?;
        let provider = FakeChannels::default();
        let mut settings = Settings::default();
        settings.provisioning.gamehub_channel = "monitoring".to_string();

        let report = provision_layout(&db, &provider, "g1", &settings).await?;
        assert_eq!(report.channels.len(), 3);
        Ok(())
    }
}
