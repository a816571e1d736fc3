//! Dashboard entity - One configured dashboard per guild and kind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dashboard database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboards")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub guild_id: String,
    /// Dashboard kind: `"welcome"`, `"monitoring"`, `"project"` or `"gamehub"`
    pub kind: String,
    /// Whether the refresh loop keeps this dashboard up to date
    pub is_active: bool,
    /// When the dashboard was created
    pub created_at: DateTimeUtc,
    /// When the dashboard configuration last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Dashboard and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One dashboard has many components (buttons)
    #[sea_orm(has_many = "super::dashboard_component::Entity")]
    Components,
    /// One dashboard has many posted messages (at most one is kept)
    #[sea_orm(has_many = "super::dashboard_message::Entity")]
    Messages,
}

impl Related<super::dashboard_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Components.def()
    }
}

impl Related<super::dashboard_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
