//! Threshold alerts.
//!
//! Each [`ThresholdRule`] watches one metric. A breach opens an alert unless one is
//! already open for that metric; recovery resolves it. Open alerts can also be
//! resolved by hand with `/resolve_alert`.

use super::metrics::{
    self, CPU_PERCENT, DISK_PERCENT, MEMORY_PERCENT, game_online_metric, service_up_metric,
};
use crate::{
    config::Settings,
    entities::{Alert, alert},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::fmt;
use tracing::{info, warn};

/// Direction in which a value breaches its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Breach when `value >= threshold`
    Above,
    /// Breach when `value < threshold`
    Below,
}

impl Comparison {
    /// Whether `value` breaches `threshold`.
    #[must_use]
    pub fn breached(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Above => value >= threshold,
            Self::Below => value < threshold,
        }
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Needs attention soon
    Warning,
    /// Needs attention now
    Critical,
}

impl Severity {
    /// Stored form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Indicator used in embeds.
    #[must_use]
    pub fn emoji_for(stored: &str) -> &'static str {
        if stored == Self::Critical.as_str() {
            "🚨"
        } else {
            "⚠️"
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    /// Metric name the rule watches
    pub metric: String,
    /// Breach direction
    pub comparison: Comparison,
    /// Threshold value
    pub threshold: f64,
    /// Severity of the alert raised on breach
    pub severity: Severity,
    /// Short human label, e.g. "CPU usage"
    pub label: String,
}

impl ThresholdRule {
    fn message(&self, value: f64) -> String {
        match self.comparison {
            Comparison::Above => format!(
                "{} is {value:.1}, at or above the {:.1} threshold",
                self.label, self.threshold
            ),
            Comparison::Below => format!("{} is down", self.label),
        }
    }
}

/// What [`evaluate_rule`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    /// A new alert was opened
    Opened(alert::Model),
    /// The open alert was resolved
    Resolved(alert::Model),
    /// Nothing changed
    Unchanged,
}

/// Rules for the host metrics, every configured service and every game server.
#[must_use]
pub fn rules_for(settings: &Settings) -> Vec<ThresholdRule> {
    let monitoring = &settings.monitoring;
    let mut rules = vec![
        ThresholdRule {
            metric: CPU_PERCENT.to_string(),
            comparison: Comparison::Above,
            threshold: monitoring.cpu_alert_percent,
            severity: Severity::Warning,
            label: "CPU usage".to_string(),
        },
        ThresholdRule {
            metric: MEMORY_PERCENT.to_string(),
            comparison: Comparison::Above,
            threshold: monitoring.memory_alert_percent,
            severity: Severity::Warning,
            label: "Memory usage".to_string(),
        },
        ThresholdRule {
            metric: DISK_PERCENT.to_string(),
            comparison: Comparison::Above,
            threshold: monitoring.disk_alert_percent,
            severity: Severity::Critical,
            label: format!("Disk usage on {}", monitoring.disk_path),
        },
    ];

    rules.extend(monitoring.services.iter().map(|name| ThresholdRule {
        metric: service_up_metric(name),
        comparison: Comparison::Below,
        threshold: 1.0,
        severity: Severity::Critical,
        label: format!("Service {name}"),
    }));

    rules.extend(settings.game_servers.iter().map(|server| ThresholdRule {
        metric: game_online_metric(&server.name),
        comparison: Comparison::Below,
        threshold: 1.0,
        severity: Severity::Warning,
        label: format!("Game server {}", server.name),
    }));

    rules
}

/// The open alert for `metric_name`, if any.
pub async fn open_alert_for(
    db: &DatabaseConnection,
    metric_name: &str,
) -> Result<Option<alert::Model>> {
    Alert::find()
        .filter(alert::Column::MetricName.eq(metric_name))
        .filter(alert::Column::IsResolved.eq(false))
        .order_by_desc(alert::Column::CreatedAt)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies `rule` to a fresh `value`.
pub async fn evaluate_rule(
    db: &DatabaseConnection,
    rule: &ThresholdRule,
    value: f64,
    now: DateTime<Utc>,
) -> Result<AlertOutcome> {
    let open = open_alert_for(db, &rule.metric).await?;
    let breached = rule.comparison.breached(value, rule.threshold);

    match (breached, open) {
        (true, None) => {
            let message = rule.message(value);
            warn!("Alert opened ({}): {message}", rule.severity);
            let opened = alert::ActiveModel {
                metric_name: Set(rule.metric.clone()),
                severity: Set(rule.severity.as_str().to_string()),
                message: Set(message),
                value: Set(value),
                threshold: Set(rule.threshold),
                is_resolved: Set(false),
                created_at: Set(now),
                resolved_at: Set(None),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(AlertOutcome::Opened(opened))
        }
        (false, Some(existing)) => {
            info!("Alert {} on {} recovered", existing.id, existing.metric_name);
            Ok(AlertOutcome::Resolved(mark_resolved(db, existing, now).await?))
        }
        _ => Ok(AlertOutcome::Unchanged),
    }
}

/// Evaluates every rule whose metric has a latest sample.
///
/// Returns `(opened, resolved)` counts.
pub async fn evaluate_all(
    db: &DatabaseConnection,
    rules: &[ThresholdRule],
    now: DateTime<Utc>,
) -> Result<(usize, usize)> {
    let mut opened = 0;
    let mut resolved = 0;
    for rule in rules {
        let Some(sample) = metrics::latest_metric(db, &rule.metric).await? else {
            continue;
        };
        match evaluate_rule(db, rule, sample.value, now).await? {
            AlertOutcome::Opened(_) => opened += 1,
            AlertOutcome::Resolved(_) => resolved += 1,
            AlertOutcome::Unchanged => {}
        }
    }
    Ok((opened, resolved))
}

/// Unresolved alerts, newest first.
pub async fn open_alerts(db: &DatabaseConnection) -> Result<Vec<alert::Model>> {
    Alert::find()
        .filter(alert::Column::IsResolved.eq(false))
        .order_by_desc(alert::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolves an alert by ID. Resolving an already resolved alert is a no-op.
pub async fn resolve_alert(db: &DatabaseConnection, id: i64) -> Result<alert::Model> {
    let existing = Alert::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::AlertNotFound { id })?;

    if existing.is_resolved {
        return Ok(existing);
    }
    mark_resolved(db, existing, Utc::now()).await
}

async fn mark_resolved(
    db: &DatabaseConnection,
    existing: alert::Model,
    now: DateTime<Utc>,
) -> Result<alert::Model> {
    let mut active_model: alert::ActiveModel = existing.into();
    active_model.is_resolved = Set(true);
    active_model.resolved_at = Set(Some(now));
    active_model.update(db).await.map_err(Into::into)
}
