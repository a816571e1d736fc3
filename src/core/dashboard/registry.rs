//! In-memory map of where each dashboard is posted.
//!
//! The refresh loop and the interaction handler read it on every tick and click, so it
//! lives in a [`DashMap`] instead of going through the database. [`DashboardRegistry::hydrate`]
//! rebuilds it from the stored dashboard messages on startup.

use super::{DashboardKind, repository};
use crate::errors::Result;
use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// A posted dashboard message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLocation {
    /// Database ID of the dashboard row
    pub dashboard_id: i64,
    /// Channel the message is in
    pub channel_id: u64,
    /// The message itself
    pub message_id: u64,
}

type Key = (String, DashboardKind);

/// `(guild, kind) -> location` map shared across tasks.
#[derive(Debug, Default)]
pub struct DashboardRegistry {
    entries: DashMap<Key, DashboardLocation>,
}

impl DashboardRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the guild's dashboard of `kind` is posted.
    #[must_use]
    pub fn get(&self, guild_id: &str, kind: DashboardKind) -> Option<DashboardLocation> {
        self.entries
            .get(&(guild_id.to_string(), kind))
            .map(|entry| *entry.value())
    }

    /// Records a location, returning the one it replaced.
    pub fn set(
        &self,
        guild_id: &str,
        kind: DashboardKind,
        location: DashboardLocation,
    ) -> Option<DashboardLocation> {
        self.entries.insert((guild_id.to_string(), kind), location)
    }

    /// Forgets a location, returning it.
    pub fn remove(&self, guild_id: &str, kind: DashboardKind) -> Option<DashboardLocation> {
        self.entries
            .remove(&(guild_id.to_string(), kind))
            .map(|(_, location)| location)
    }

    /// Forgets the entry only while it still points at `location`.
    pub fn remove_if_current(
        &self,
        guild_id: &str,
        kind: DashboardKind,
        location: DashboardLocation,
    ) -> bool {
        self.entries
            .remove_if(&(guild_id.to_string(), kind), |_, current| *current == location)
            .is_some()
    }

    /// Number of posted dashboards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is posted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every entry, sorted by guild then kind.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, DashboardKind, DashboardLocation)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| {
                let (guild_id, kind) = entry.key();
                (guild_id.clone(), *kind, *entry.value())
            })
            .collect();
        entries.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
        entries
    }

    /// Loads every active, posted dashboard from the database. Returns how many were loaded.
    ///
    /// Rows with an unknown kind or unparseable IDs are skipped with a warning.
    pub async fn hydrate(&self, db: &DatabaseConnection) -> Result<usize> {
        let mut loaded = 0;
        for (dashboard, message) in repository::posted_dashboards(db).await? {
            let Ok(kind) = dashboard.kind.parse::<DashboardKind>() else {
                warn!("Skipping dashboard {} with unknown kind '{}'", dashboard.id, dashboard.kind);
                continue;
            };
            let (Ok(channel_id), Ok(message_id)) =
                (message.channel_id.parse(), message.message_id.parse())
            else {
                warn!("Skipping dashboard {} with invalid message IDs", dashboard.id);
                continue;
            };

            self.set(&dashboard.guild_id, kind, DashboardLocation {
                dashboard_id: dashboard.id,
                channel_id,
                message_id,
            });
            loaded += 1;
        }
        info!("Loaded {loaded} dashboards into the registry");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    fn location(message_id: u64) -> DashboardLocation {
        DashboardLocation {
            dashboard_id: 1,
            channel_id: 10,
            message_id,
        }
    }

    #[test]
    fn test_get_set_remove() {
        let registry = DashboardRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.get("g1", DashboardKind::Monitoring), None);

        assert_eq!(registry.set("g1", DashboardKind::Monitoring, location(1)), None);
        assert_eq!(
            registry.get("g1", DashboardKind::Monitoring),
            Some(location(1))
        );
        assert_eq!(registry.get("g1", DashboardKind::Welcome), None);
        assert_eq!(registry.get("g2", DashboardKind::Monitoring), None);

        assert_eq!(
            registry.set("g1", DashboardKind::Monitoring, location(2)),
            Some(location(1))
        );
        assert_eq!(registry.len(), 1);

        assert_eq!(
            registry.remove("g1", DashboardKind::Monitoring),
            Some(location(2))
        );
        assert_eq!(registry.remove("g1", DashboardKind::Monitoring), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_if_current() {
        let registry = DashboardRegistry::new();
        registry.set("g1", DashboardKind::GameHub, location(2));

        assert!(!registry.remove_if_current("g1", DashboardKind::GameHub, location(1)));
        assert_eq!(registry.get("g1", DashboardKind::GameHub), Some(location(2)));
        assert!(registry.remove_if_current("g1", DashboardKind::GameHub, location(2)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entries_are_sorted() {
        let registry = DashboardRegistry::new();
        registry.set("g2", DashboardKind::Welcome, location(3));
        registry.set("g1", DashboardKind::GameHub, location(2));
        registry.set("g1", DashboardKind::Welcome, location(1));

        let entries = registry.entries();
        assert_eq!(entries[0].0, "g1");
        assert_eq!(entries[0].1, DashboardKind::Welcome);
        assert_eq!(entries[1].1, DashboardKind::GameHub);
        assert_eq!(entries[2].0, "g2");
    }

    #[tokio::test]
    async fn test_hydrate_from_database() -> Result<()> {
        let db = setup_test_db().await?;
        let posted = repository::ensure_dashboard(&db, "g1", DashboardKind::Project).await?;
        repository::record_message(&db, posted.id, "100", "200").await?;
        let broken = repository::ensure_dashboard(&db, "g1", DashboardKind::Welcome).await?;
        repository::record_message(&db, broken.id, "100", "not-a-number").await?;
        repository::ensure_dashboard(&db, "g1", DashboardKind::GameHub).await?;

        let registry = DashboardRegistry::new();
        assert_eq!(registry.hydrate(&db).await?, 1);
        assert_eq!(
            registry.get("g1", DashboardKind::Project),
            Some(DashboardLocation {
                dashboard_id: posted.id,
                channel_id: 100,
                message_id: 200,
            })
        );
        Ok(())
    }
}
