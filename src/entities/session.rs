//! Session entity - Access tokens issued to users through `/session start`.
//!
//! The token itself is stored AES-GCM encrypted (base64), never in plaintext.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user's row ID
    pub user_id: i64,
    /// Encrypted session token
    pub token_ciphertext: String,
    /// When the session was issued
    pub created_at: DateTimeUtc,
    /// When the session stops being valid
    pub expires_at: DateTimeUtc,
    /// Set when the owner revokes the session or starts a new one
    pub revoked: bool,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each session belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
