//! Audit log entity - Append-only record of administrative actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Guild the action happened in, `None` for DMs or background work
    pub guild_id: Option<String>,
    /// Discord user ID of the actor (`"system"` for the bot itself)
    pub actor_id: String,
    /// Short machine-readable action name (e.g. `"dashboard.create"`)
    pub action: String,
    /// Free-form details
    pub details: String,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

/// `AuditLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
