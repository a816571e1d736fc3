//! Category mapping entity - Logical category name to live Discord category ID.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category mapping database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_mappings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    pub guild_id: String,
    /// Logical name from configuration
    pub name: String,
    /// Discord category channel ID
    pub category_id: String,
    /// When the mapping was first recorded
    pub created_at: DateTimeUtc,
    /// When the mapping last pointed at a new category
    pub updated_at: DateTimeUtc,
}

/// `CategoryMapping` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
