//! Dashboard message entity - Where a dashboard is currently posted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dashboard message database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboard_messages")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning dashboard
    pub dashboard_id: i64,
    /// Discord channel ID
    pub channel_id: String,
    /// Discord message ID
    pub message_id: String,
    /// When the message was posted
    pub created_at: DateTimeUtc,
    /// When the message was last edited by a refresh
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `DashboardMessage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each message belongs to one dashboard
    #[sea_orm(
        belongs_to = "super::dashboard::Entity",
        from = "Column::DashboardId",
        to = "super::dashboard::Column::Id"
    )]
    Dashboard,
}

impl Related<super::dashboard::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dashboard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
