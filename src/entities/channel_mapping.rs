//! Channel mapping entity - Logical channel name to live Discord channel ID.
//!
//! Lets the bot find its channels again after a restart instead of recreating them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Channel mapping database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channel_mappings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub guild_id: String,
    /// Logical name from configuration (e.g. `"monitoring"`)
    pub name: String,
    /// Discord text channel ID
    pub channel_id: String,
    /// Parent category ID, if the channel was created under one
    pub category_id: Option<String>,
    /// When the mapping was first recorded
    pub created_at: DateTimeUtc,
    /// When the mapping last pointed at a new channel
    pub updated_at: DateTimeUtc,
}

/// `ChannelMapping` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
