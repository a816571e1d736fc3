//! User business logic - Tracks Discord members the bot has interacted with and
//! the per-guild bot admin grants.

use crate::{
    entities::{AdminGrant, User, admin_grant, user},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, prelude::*};

/// Inserts the user on first sight, otherwise refreshes `username` and `last_seen_at`.
pub async fn touch_user(
    db: &DatabaseConnection,
    discord_id: &str,
    username: &str,
) -> Result<user::Model> {
    let now = Utc::now();

    if let Some(existing) = get_user(db, discord_id).await? {
        let mut active_model: user::ActiveModel = existing.into();
        active_model.username = Set(username.to_string());
        active_model.last_seen_at = Set(now);
        return active_model.update(db).await.map_err(Into::into);
    }

    let new_user = user::ActiveModel {
        discord_id: Set(discord_id.to_string()),
        username: Set(username.to_string()),
        joined_at: Set(now),
        last_seen_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await.map_err(Into::into)
}

/// Finds a user by Discord ID.
pub async fn get_user(db: &DatabaseConnection, discord_id: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn admin_grant(
    db: &DatabaseConnection,
    guild_id: &str,
    discord_id: &str,
) -> Result<Option<admin_grant::Model>> {
    AdminGrant::find()
        .filter(admin_grant::Column::GuildId.eq(guild_id))
        .filter(admin_grant::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Grants or revokes bot admin rights in one guild. Returns whether anything changed.
pub async fn set_admin(
    db: &DatabaseConnection,
    guild_id: &str,
    discord_id: &str,
    is_admin: bool,
    granted_by: &str,
) -> Result<bool> {
    let existing = admin_grant(db, guild_id, discord_id).await?;

    match (existing, is_admin) {
        (None, true) => {
            admin_grant::ActiveModel {
                guild_id: Set(guild_id.to_string()),
                discord_id: Set(discord_id.to_string()),
                granted_by: Set(granted_by.to_string()),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(true)
        }
        (Some(grant), false) => {
            AdminGrant::delete_by_id(grant.id).exec(db).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Whether the user holds a bot admin grant in `guild_id`.
pub async fn is_admin(db: &DatabaseConnection, guild_id: &str, discord_id: &str) -> Result<bool> {
    Ok(admin_grant(db, guild_id, discord_id).await?.is_some())
}

/// Number of users the bot has seen.
pub async fn count_users(db: &DatabaseConnection) -> Result<u64> {
    User::find().count(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_touch_user_inserts_then_updates() -> Result<()> {
        let db = setup_test_db().await?;

        let first = touch_user(&db, "42", "alice").await?;
        assert_eq!(first.username, "alice");

        let second = touch_user(&db, "42", "alice_renamed").await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.username, "alice_renamed");
        assert!(second.last_seen_at >= first.last_seen_at);
        assert_eq!(second.joined_at, first.joined_at);

        assert_eq!(count_users(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_admin() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(!is_admin(&db, "g1", "7").await?);

        assert!(set_admin(&db, "g1", "7", true, "1").await?);
        assert!(is_admin(&db, "g1", "7").await?);
        // Granting twice changes nothing
        assert!(!set_admin(&db, "g1", "7", true, "1").await?);

        assert!(set_admin(&db, "g1", "7", false, "1").await?);
        assert!(!is_admin(&db, "g1", "7").await?);
        assert!(!set_admin(&db, "g1", "7", false, "1").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_grants_are_per_guild() -> Result<()> {
        let db = setup_test_db().await?;
        set_admin(&db, "g1", "7", true, "1").await?;

        assert!(is_admin(&db, "g1", "7").await?);
        assert!(!is_admin(&db, "g2", "7").await?);

        set_admin(&db, "g2", "7", true, "2").await?;
        set_admin(&db, "g1", "7", false, "1").await?;
        assert!(!is_admin(&db, "g1", "7").await?);
        assert!(is_admin(&db, "g2", "7").await?);
        Ok(())
    }
}
