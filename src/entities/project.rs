//! Project entity - Homelab projects tracked per guild.
//!
//! Each project has a name, description, lifecycle status and any number of tasks.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub guild_id: String,
    /// Project name, unique within a guild
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Lifecycle status: `"planning"`, `"active"`, `"paused"` or `"done"`
    pub status: String,
    /// Discord user ID of the creator
    pub created_by: String,
    /// When the project was created
    pub created_at: DateTimeUtc,
    /// When the project was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One project has many tasks
    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
