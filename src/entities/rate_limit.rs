//! Rate limit entity - Persistent ledger of users who hit the command rate limit, per guild.
//!
//! The limiter itself is in memory; this table only records who was limited and how often.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rate limit ledger model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rate_limits")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Guild the user was limited in, `None` for DMs
    pub guild_id: Option<String>,
    /// Discord user ID
    pub user_id: String,
    /// Limiter bucket (e.g. `"commands"`)
    pub bucket: String,
    /// Number of times the user was limited
    pub hits: i32,
    /// First time the user was limited
    pub first_limited_at: DateTimeUtc,
    /// Most recent time the user was limited
    pub last_limited_at: DateTimeUtc,
}

/// `RateLimit` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
