//! Metric entity - Time series of collected samples.
//!
//! Names are dotted paths such as `system.cpu_percent`, `service.nginx.up` or
//! `game.minecraft.latency_ms`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metric sample database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metrics")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Dotted metric name
    pub name: String,
    /// Sampled value
    pub value: f64,
    /// Unit label (e.g. `"%"`, `"ms"`, `"bool"`)
    pub unit: String,
    /// When the sample was taken
    pub recorded_at: DateTimeUtc,
}

/// `Metric` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
