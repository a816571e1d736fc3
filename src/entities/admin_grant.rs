//! Admin grant entity - Bot admin rights handed out with `/admin grant`.
//!
//! Grants are per guild: being a bot admin in one server says nothing about another.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin grant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_grants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Guild the grant applies to
    pub guild_id: String,
    /// Discord user ID of the admin
    pub discord_id: String,
    /// Discord user ID of whoever granted it
    pub granted_by: String,
    /// When the grant was made
    pub created_at: DateTimeUtc,
}

/// `AdminGrant` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
