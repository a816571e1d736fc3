//! Audit log - Records administrative actions so they can be reviewed with `/audit`.

use crate::{
    entities::{AuditLog, audit_log},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Actor ID used for actions the bot performs on its own.
pub const SYSTEM_ACTOR: &str = "system";

/// Appends an entry to the audit log.
pub async fn log_action(
    db: &DatabaseConnection,
    guild_id: Option<&str>,
    actor_id: &str,
    action: &str,
    details: impl Into<String>,
) -> Result<audit_log::Model> {
    let entry = audit_log::ActiveModel {
        guild_id: Set(guild_id.map(ToString::to_string)),
        actor_id: Set(actor_id.to_string()),
        action: Set(action.to_string()),
        details: Set(details.into()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Most recent entries for a guild, newest first.
pub async fn recent_entries(
    db: &DatabaseConnection,
    guild_id: &str,
    limit: u64,
) -> Result<Vec<audit_log::Model>> {
    AuditLog::find()
        .filter(audit_log::Column::GuildId.eq(guild_id))
        .order_by_desc(audit_log::Column::CreatedAt)
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_recent_entries_newest_first_and_scoped() -> Result<()> {
        let db = setup_test_db().await?;

        log_action(&db, Some("g1"), "u1", "project.create", "homelab").await?;
        log_action(&db, Some("g1"), "u1", "project.delete", "homelab").await?;
        log_action(&db, Some("g2"), "u2", "setup", "other guild").await?;
        log_action(&db, None, SYSTEM_ACTOR, "startup", "").await?;

        let entries = recent_entries(&db, "g1", 10).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "project.delete");
        assert_eq!(entries[1].action, "project.create");

        let limited = recent_entries(&db, "g1", 1).await?;
        assert_eq!(limited.len(), 1);
        Ok(())
    }
}
