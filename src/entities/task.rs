//! Task entity - A unit of work inside a project.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Task database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Short task title
    pub title: String,
    /// Status: `"todo"`, `"in_progress"` or `"done"`
    pub status: String,
    /// Discord user ID of the assignee, if any
    pub assignee: Option<String>,
    /// When the task was created
    pub created_at: DateTimeUtc,
    /// When the task was moved to done
    pub completed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Task and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each task belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
