//! User entity - Discord members the bot has seen.
//!
//! Rows are upserted whenever a member joins or runs a command, so the table doubles
//! as a lightweight member directory for the welcome dashboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID
    #[sea_orm(unique)]
    pub discord_id: String,
    /// Last known Discord username
    pub username: String,
    /// When the bot first saw this user
    pub joined_at: DateTimeUtc,
    /// When the user last interacted with the bot
    pub last_seen_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
