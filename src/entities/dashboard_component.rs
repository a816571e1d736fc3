//! Dashboard component entity - A button attached to a dashboard message.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dashboard component database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dashboard_components")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning dashboard
    pub dashboard_id: i64,
    /// Button action name, encoded into the Discord custom ID
    pub action: String,
    /// Button label
    pub label: String,
    /// Button style: `"primary"`, `"secondary"`, `"success"` or `"danger"`
    pub style: String,
    /// Sort order, lowest first
    pub position: i32,
    /// Disabled components are not rendered
    pub is_enabled: bool,
}

/// Defines relationships between `DashboardComponent` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each component belongs to one dashboard
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
