//! Alert entity - Threshold breaches raised by the monitoring collectors.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alert database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Metric that breached its threshold
    pub metric_name: String,
    /// `"warning"` or `"critical"`
    pub severity: String,
    /// Human-readable description
    pub message: String,
    /// Value that triggered the alert
    pub value: f64,
    /// Threshold that was crossed
    pub threshold: f64,
    /// Whether the alert has been resolved
    pub is_resolved: bool,
    /// When the alert was raised
    pub created_at: DateTimeUtc,
    /// When the alert was resolved
    pub resolved_at: Option<DateTimeUtc>,
}

/// `Alert` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
