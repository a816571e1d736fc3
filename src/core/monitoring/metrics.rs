//! Metric storage - Writes collector output to the `metrics` table and reads it back
//! for dashboards.

use super::{game_servers::GameServerStatus, services::ServiceStatus, system::SystemSnapshot};
use crate::{
    entities::{Metric, metric},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::LikeExpr};
use std::collections::HashSet;

/// CPU usage, percent
pub const CPU_PERCENT: &str = "system.cpu_percent";
/// Memory usage, percent
pub const MEMORY_PERCENT: &str = "system.memory_percent";
/// Disk usage of the configured mount, percent
pub const DISK_PERCENT: &str = "system.disk_percent";
/// 1 minute load average
pub const LOAD_1: &str = "system.load_1";
/// Seconds since boot
pub const UPTIME_SECS: &str = "system.uptime_secs";
/// Memory in use, bytes
pub const MEMORY_USED_BYTES: &str = "system.memory_used_bytes";
/// Total memory, bytes
pub const MEMORY_TOTAL_BYTES: &str = "system.memory_total_bytes";
/// Prefix of per-service up/down samples
pub const SERVICE_PREFIX: &str = "service.";
/// Prefix of per-game-server samples
pub const GAME_PREFIX: &str = "game.";

/// Normalises a configured name for use inside a metric name.
#[must_use]
pub fn metric_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// `service.<name>.up`
#[must_use]
pub fn service_up_metric(name: &str) -> String {
    format!("{SERVICE_PREFIX}{}.up", metric_key(name))
}

/// `game.<name>.online`
#[must_use]
pub fn game_online_metric(name: &str) -> String {
    format!("{GAME_PREFIX}{}.online", metric_key(name))
}

/// `game.<name>.latency_ms`
#[must_use]
pub fn game_latency_metric(name: &str) -> String {
    format!("{GAME_PREFIX}{}.latency_ms", metric_key(name))
}

/// A sample waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name
    pub name: String,
    /// Value
    pub value: f64,
    /// Unit label
    pub unit: &'static str,
}

impl Sample {
    fn new(name: impl Into<String>, value: f64, unit: &'static str) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// Samples derived from a host snapshot.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn snapshot_samples(snapshot: &SystemSnapshot) -> Vec<Sample> {
    vec![
        Sample::new(CPU_PERCENT, snapshot.cpu_percent, "%"),
        Sample::new(MEMORY_PERCENT, snapshot.memory.used_percent(), "%"),
        Sample::new(
            MEMORY_USED_BYTES,
            snapshot.memory.used_bytes() as f64,
            "bytes",
        ),
        Sample::new(
            MEMORY_TOTAL_BYTES,
            snapshot.memory.total_bytes as f64,
            "bytes",
        ),
        Sample::new(DISK_PERCENT, snapshot.disk.used_percent(), "%"),
        Sample::new(LOAD_1, snapshot.load.one, "load"),
        Sample::new(UPTIME_SECS, snapshot.uptime_secs as f64, "s"),
    ]
}

/// One up/down sample per service.
#[must_use]
pub fn service_samples(statuses: &[ServiceStatus]) -> Vec<Sample> {
    statuses
        .iter()
        .map(|s| Sample::new(service_up_metric(&s.name), bool_value(s.state.is_up()), "bool"))
        .collect()
}

/// Online flag and (when online) latency per game server.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn game_server_samples(statuses: &[GameServerStatus]) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(statuses.len() * 2);
    for status in statuses {
        samples.push(Sample::new(
            game_online_metric(&status.name),
            bool_value(status.online),
            "bool",
        ));
        if let Some(latency) = status.latency_ms {
            samples.push(Sample::new(
                game_latency_metric(&status.name),
                latency as f64,
                "ms",
            ));
        }
    }
    samples
}

/// Writes a single sample.
pub async fn record_metric(
    db: &DatabaseConnection,
    name: &str,
    value: f64,
    unit: &str,
    at: DateTime<Utc>,
) -> Result<metric::Model> {
    metric::ActiveModel {
        name: Set(name.to_string()),
        value: Set(value),
        unit: Set(unit.to_string()),
        recorded_at: Set(at),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Writes a batch of samples with a shared timestamp. Returns how many were written.
pub async fn record_samples(
    db: &DatabaseConnection,
    samples: &[Sample],
    at: DateTime<Utc>,
) -> Result<usize> {
    if samples.is_empty() {
        return Ok(0);
    }

    let rows = samples.iter().map(|s| metric::ActiveModel {
        name: Set(s.name.clone()),
        value: Set(s.value),
        unit: Set(s.unit.to_string()),
        recorded_at: Set(at),
        ..Default::default()
    });
    Metric::insert_many(rows).exec(db).await?;
    Ok(samples.len())
}

/// Writes every sample of a host snapshot.
pub async fn record_snapshot(
    db: &DatabaseConnection,
    snapshot: &SystemSnapshot,
    at: DateTime<Utc>,
) -> Result<usize> {
    record_samples(db, &snapshot_samples(snapshot), at).await
}

/// Newest sample of a metric.
pub async fn latest_metric(db: &DatabaseConnection, name: &str) -> Result<Option<metric::Model>> {
    Metric::find()
        .filter(metric::Column::Name.eq(name))
        .order_by_desc(metric::Column::RecordedAt)
        .order_by_desc(metric::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Newest sample of every metric whose name starts with `prefix`, ordered by name.
pub async fn latest_metrics_with_prefix(
    db: &DatabaseConnection,
    prefix: &str,
) -> Result<Vec<metric::Model>> {
    let rows = Metric::find()
        .filter(Expr::col(metric::Column::Name).like(prefix_pattern(prefix)))
        .order_by_desc(metric::Column::RecordedAt)
        .order_by_desc(metric::Column::Id)
        .all(db)
        .await?;

    let mut seen = HashSet::new();
    let mut latest: Vec<metric::Model> = rows
        .into_iter()
        .filter(|row| seen.insert(row.name.clone()))
        .collect();
    latest.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(latest)
}

/// `LIKE` pattern matching names that start with `prefix` literally.
fn prefix_pattern(prefix: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

/// Deletes samples recorded before `older_than`. Returns how many were removed.
pub async fn prune_metrics(db: &DatabaseConnection, older_than: DateTime<Utc>) -> Result<u64> {
    let result = Metric::delete_many()
        .filter(metric::Column::RecordedAt.lt(older_than))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::monitoring::services::ServiceState;
    use crate::test_utils::{sample_snapshot, setup_test_db};
    use chrono::Duration;

    #[test]
    fn test_metric_names() {
        assert_eq!(service_up_metric("Home Assistant"), "service.home_assistant.up");
        assert_eq!(game_online_metric("mc-survival"), "game.mc-survival.online");
        assert_eq!(game_latency_metric("Valheim"), "game.valheim.latency_ms");
    }

    #[test]
    fn test_snapshot_samples() {
        let samples = snapshot_samples(&sample_snapshot(40.0));
        let cpu = samples.iter().find(|s| s.name == CPU_PERCENT).unwrap();
        assert_eq!(cpu.value, 40.0);
        let memory = samples.iter().find(|s| s.name == MEMORY_PERCENT).unwrap();
        assert_eq!(memory.value, 50.0);
    }

    #[test]
    fn test_game_server_samples_skip_latency_when_offline() {
        let statuses = vec![
            GameServerStatus {
                name: "up".to_string(),
                game: String::new(),
                address: "h:1".to_string(),
                online: true,
                latency_ms: Some(12),
            },
            GameServerStatus {
                name: "down".to_string(),
                game: String::new(),
                address: "h:2".to_string(),
                online: false,
                latency_ms: None,
            },
        ];
        let samples = game_server_samples(&statuses);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].name, "game.down.online");
        assert_eq!(samples[2].value, 0.0);
    }

    #[test]
    fn test_service_samples() {
        let samples = service_samples(&[ServiceStatus {
            name: "nginx".to_string(),
            state: ServiceState::Stopped,
            detail: String::new(),
        }]);
        assert_eq!(samples[0].name, "service.nginx.up");
        assert_eq!(samples[0].value, 0.0);
    }

    #[tokio::test]
    async fn test_latest_metric_and_prefix_dedup() -> Result<()> {
        let db = setup_test_db().await?;
        let earlier = Utc::now() - Duration::minutes(5);
        let now = Utc::now();

        record_metric(&db, "service.nginx.up", 1.0, "bool", earlier).await?;
        record_metric(&db, "service.nginx.up", 0.0, "bool", now).await?;
        record_metric(&db, "service.db.up", 1.0, "bool", earlier).await?;
        record_metric(&db, CPU_PERCENT, 12.0, "%", now).await?;

        let latest = latest_metric(&db, "service.nginx.up").await?.unwrap();
        assert_eq!(latest.value, 0.0);

        let services = latest_metrics_with_prefix(&db, SERVICE_PREFIX).await?;
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "service.db.up");
        assert_eq!(services[1].value, 0.0);

        assert!(latest_metric(&db, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_prefix_treats_underscore_literally() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        record_metric(&db, &game_online_metric("my server"), 1.0, "bool", now).await?;
        record_metric(&db, "game.myXserver.online", 0.0, "bool", now).await?;
        record_metric(&db, "game.my%server.online", 0.0, "bool", now).await?;

        let rows = latest_metrics_with_prefix(&db, "game.my_server.").await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "game.my_server.online");
        Ok(())
    }

    #[tokio::test]
    async fn test_record_samples_and_prune() -> Result<()> {
        let db = setup_test_db().await?;
        let old = Utc::now() - Duration::hours(48);

        let written = record_snapshot(&db, &sample_snapshot(10.0), old).await?;
        assert_eq!(written, 7);
        assert_eq!(record_samples(&db, &[], old).await?, 0);
        record_metric(&db, CPU_PERCENT, 20.0, "%", Utc::now()).await?;

        let removed = prune_metrics(&db, Utc::now() - Duration::hours(24)).await?;
        assert_eq!(removed, 7);
        assert_eq!(latest_metric(&db, CPU_PERCENT).await?.unwrap().value, 20.0);
        Ok(())
    }
}
