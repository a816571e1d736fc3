//! Posting, refreshing and removing dashboard messages.
//!
//! The database keeps the authoritative location of each dashboard; the registry
//! mirrors it so the refresh loop does not hit the database for every tick.

use super::{BotData, render};
use crate::{
    core::dashboard::{self, DashboardKind, DashboardLocation, DashboardRegistry, repository},
    errors::Result,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};

const UNKNOWN_CHANNEL: isize = 10003;
const UNKNOWN_MESSAGE: isize = 10008;

fn discord_error_code(error: &serenity::Error) -> Option<isize> {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) = error {
        return Some(response.error.code);
    }
    None
}

/// What to do after Discord refused to edit a dashboard message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditFailure {
    /// The message is gone: post it again
    Repost,
    /// The channel is gone: stop tracking the dashboard
    Forget,
    /// The dashboard was removed or moved while the edit was in flight
    Ignore,
    /// Any other error
    Propagate,
}

/// Decides how to react to a failed edit of the message at `location`.
///
/// The refresh loop works from a snapshot of the registry, so the dashboard may have
/// been removed or reposted since; only the still-current, active location is acted on.
async fn classify_edit_failure(
    db: &DatabaseConnection,
    registry: &DashboardRegistry,
    code: Option<isize>,
    guild_id: &str,
    kind: DashboardKind,
    location: DashboardLocation,
) -> Result<EditFailure> {
    if !matches!(code, Some(UNKNOWN_MESSAGE | UNKNOWN_CHANNEL)) {
        return Ok(EditFailure::Propagate);
    }
    if registry.get(guild_id, kind) != Some(location) {
        return Ok(EditFailure::Ignore);
    }
    let active = repository::get_dashboard(db, guild_id, kind)
        .await?
        .is_some_and(|d| d.is_active && d.id == location.dashboard_id);
    if !active {
        return Ok(EditFailure::Ignore);
    }

    Ok(if code == Some(UNKNOWN_MESSAGE) {
        EditFailure::Repost
    } else {
        EditFailure::Forget
    })
}

/// Stops tracking the message at `location`. The dashboard itself stays active.
async fn forget_dashboard(
    db: &DatabaseConnection,
    registry: &DashboardRegistry,
    guild_id: &str,
    kind: DashboardKind,
    location: DashboardLocation,
) -> Result<()> {
    if registry.remove_if_current(guild_id, kind, location) {
        repository::clear_message(db, location.dashboard_id).await?;
    }
    Ok(())
}

/// Posts the dashboard in `channel_id`, replacing any previous message.
pub async fn post_dashboard(
    http: &serenity::Http,
    data: &BotData,
    guild_id: &str,
    kind: DashboardKind,
    channel_id: serenity::ChannelId,
) -> Result<DashboardLocation> {
    let db = &data.database;
    let record = repository::ensure_dashboard(db, guild_id, kind).await?;
    let view = dashboard::build_view(db, &data.settings, guild_id, kind).await?;

    let message = channel_id
        .send_message(http, render::dashboard_message(&view))
        .await?;

    let location = DashboardLocation {
        dashboard_id: record.id,
        channel_id: channel_id.get(),
        message_id: message.id.get(),
    };
    repository::record_message(
        db,
        record.id,
        &location.channel_id.to_string(),
        &location.message_id.to_string(),
    )
    .await?;

    if let Some(previous) = data.registry.set(guild_id, kind, location) {
        delete_message(http, previous).await;
    }
    info!("Posted {kind} dashboard in channel {channel_id} of guild {guild_id}");
    Ok(location)
}

/// Re-renders a posted dashboard in place.
///
/// If the message was deleted it is posted again in the same channel; if the channel
/// is gone too the dashboard is forgotten. Neither happens when the dashboard was
/// removed or moved in the meantime.
pub async fn refresh_dashboard(
    http: &serenity::Http,
    data: &BotData,
    guild_id: &str,
    kind: DashboardKind,
    location: DashboardLocation,
) -> Result<()> {
    let view = dashboard::build_view(&data.database, &data.settings, guild_id, kind).await?;
    let channel_id = serenity::ChannelId::new(location.channel_id);
    let edit = channel_id
        .edit_message(
            http,
            serenity::MessageId::new(location.message_id),
            render::dashboard_edit(&view),
        )
        .await;

    match edit {
        Ok(_) => {
            debug!("Refreshed {kind} dashboard in guild {guild_id}");
            Ok(())
        }
        Err(e) => {
            let failure = classify_edit_failure(
                &data.database,
                &data.registry,
                discord_error_code(&e),
                guild_id,
                kind,
                location,
            )
            .await?;
            match failure {
                EditFailure::Repost => {
                    warn!("{kind} dashboard message in guild {guild_id} was deleted, reposting");
                    post_dashboard(http, data, guild_id, kind, channel_id).await?;
                    Ok(())
                }
                EditFailure::Forget => {
                    warn!(
                        "{kind} dashboard channel in guild {guild_id} was deleted, forgetting it"
                    );
                    forget_dashboard(&data.database, &data.registry, guild_id, kind, location)
                        .await
                }
                EditFailure::Ignore => {
                    debug!("{kind} dashboard in guild {guild_id} changed during refresh");
                    Ok(())
                }
                EditFailure::Propagate => Err(e.into()),
            }
        }
    }
}

/// Refreshes the guild's dashboard of `kind` if it is posted. Failures are logged.
pub async fn refresh_if_posted(
    http: &serenity::Http,
    data: &BotData,
    guild_id: &str,
    kind: DashboardKind,
) {
    let Some(location) = data.registry.get(guild_id, kind) else {
        return;
    };
    if let Err(e) = refresh_dashboard(http, data, guild_id, kind, location).await {
        warn!("Could not refresh {kind} dashboard in guild {guild_id}: {e}");
    }
}

/// Deletes the dashboard message and deactivates the dashboard.
/// Returns whether a posted message was removed.
pub async fn remove_dashboard(
    http: &serenity::Http,
    data: &BotData,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<bool> {
    let db = &data.database;
    let record = repository::require_dashboard(db, guild_id, kind).await?;

    let removed = data.registry.remove(guild_id, kind);
    if let Some(location) = removed {
        delete_message(http, location).await;
    }
    repository::clear_message(db, record.id).await?;
    repository::set_active(db, record.id, false).await?;
    info!("Removed {kind} dashboard from guild {guild_id}");
    Ok(removed.is_some())
}

async fn delete_message(http: &serenity::Http, location: DashboardLocation) {
    let result = serenity::ChannelId::new(location.channel_id)
        .delete_message(http, serenity::MessageId::new(location.message_id))
        .await;
    if let Err(e) = result {
        // Already gone is fine
        if !matches!(
            discord_error_code(&e),
            Some(UNKNOWN_MESSAGE | UNKNOWN_CHANNEL)
        ) {
            warn!("Could not delete old dashboard message: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    const KIND: DashboardKind = DashboardKind::Monitoring;

    async fn posted(
        db: &DatabaseConnection,
        registry: &DashboardRegistry,
        guild_id: &str,
    ) -> Result<DashboardLocation> {
        let record = repository::ensure_dashboard(db, guild_id, KIND).await?;
        repository::record_message(db, record.id, "10", "20").await?;
        let location = DashboardLocation {
            dashboard_id: record.id,
            channel_id: 10,
            message_id: 20,
        };
        registry.set(guild_id, KIND, location);
        Ok(location)
    }

    #[tokio::test]
    async fn test_deleted_message_is_reposted() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let location = posted(&db, &registry, "g1").await?;

        let failure =
            classify_edit_failure(&db, &registry, Some(UNKNOWN_MESSAGE), "g1", KIND, location)
                .await?;
        assert_eq!(failure, EditFailure::Repost);
        Ok(())
    }

    #[tokio::test]
    async fn test_removed_dashboard_is_not_reposted() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let location = posted(&db, &registry, "g1").await?;

        // What remove_dashboard does while a refresh is in flight
        registry.remove("g1", KIND);
        repository::clear_message(&db, location.dashboard_id).await?;
        repository::set_active(&db, location.dashboard_id, false).await?;

        for code in [UNKNOWN_MESSAGE, UNKNOWN_CHANNEL] {
            let failure =
                classify_edit_failure(&db, &registry, Some(code), "g1", KIND, location).await?;
            assert_eq!(failure, EditFailure::Ignore);
        }
        assert_eq!(registry.get("g1", KIND), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_dashboard_is_not_reposted() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let location = posted(&db, &registry, "g1").await?;
        repository::set_active(&db, location.dashboard_id, false).await?;

        let failure =
            classify_edit_failure(&db, &registry, Some(UNKNOWN_MESSAGE), "g1", KIND, location)
                .await?;
        assert_eq!(failure, EditFailure::Ignore);
        Ok(())
    }

    #[tokio::test]
    async fn test_moved_dashboard_is_left_alone() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let stale = posted(&db, &registry, "g1").await?;
        registry.set("g1", KIND, DashboardLocation {
            message_id: 21,
            ..stale
        });

        let failure =
            classify_edit_failure(&db, &registry, Some(UNKNOWN_CHANNEL), "g1", KIND, stale)
                .await?;
        assert_eq!(failure, EditFailure::Ignore);

        forget_dashboard(&db, &registry, "g1", KIND, stale).await?;
        assert_eq!(registry.get("g1", KIND).map(|l| l.message_id), Some(21));
        assert!(repository::get_message(&db, stale.dashboard_id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_channel_forgets_dashboard() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let location = posted(&db, &registry, "g1").await?;

        let failure =
            classify_edit_failure(&db, &registry, Some(UNKNOWN_CHANNEL), "g1", KIND, location)
                .await?;
        assert_eq!(failure, EditFailure::Forget);

        forget_dashboard(&db, &registry, "g1", KIND, location).await?;
        assert_eq!(registry.get("g1", KIND), None);
        assert!(repository::get_message(&db, location.dashboard_id).await?.is_none());
        let record = repository::require_dashboard(&db, "g1", KIND).await?;
        assert!(record.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_errors_propagate() -> Result<()> {
        let db = setup_test_db().await?;
        let registry = DashboardRegistry::new();
        let location = posted(&db, &registry, "g1").await?;

        for code in [None, Some(50013)] {
            let failure = classify_edit_failure(&db, &registry, code, "g1", KIND, location).await?;
            assert_eq!(failure, EditFailure::Propagate);
        }
        Ok(())
    }
}
