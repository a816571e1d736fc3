//! Monitoring collectors.
//!
//! Collectors shell out to standard OS tools (`df`, `ps`, `docker`) or read `/proc`
//! and parse the text they get back. [`collect_and_store`] runs all of them, writes
//! the results as metric samples and evaluates the alert rules.

pub mod alerts;
pub mod game_servers;
pub mod metrics;
pub mod services;
pub mod system;

use crate::{
    config::Settings,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use game_servers::GameServerStatus;
use sea_orm::DatabaseConnection;
use services::ServiceStatus;
use system::SystemSnapshot;
use tracing::{debug, warn};

/// Runs an external command and returns its stdout.
pub(crate) async fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| Error::Collector {
            message: format!("Failed to execute {program}: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Collector {
            message: format!("{program} failed: {}", stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// What one collection pass produced.
#[derive(Debug, Clone, Default)]
pub struct CollectionReport {
    /// Host snapshot, if the system collector succeeded
    pub snapshot: Option<SystemSnapshot>,
    /// Configured service states
    pub services: Vec<ServiceStatus>,
    /// Game server probes
    pub game_servers: Vec<GameServerStatus>,
    /// Samples written to the database
    pub samples_written: usize,
    /// Alerts opened during this pass
    pub alerts_opened: usize,
    /// Alerts resolved during this pass
    pub alerts_resolved: usize,
}

/// Stores already collected data and evaluates alerts against it.
pub async fn store_and_evaluate(
    db: &DatabaseConnection,
    settings: &Settings,
    snapshot: Option<SystemSnapshot>,
    services: Vec<ServiceStatus>,
    game_servers: Vec<GameServerStatus>,
    now: DateTime<Utc>,
) -> Result<CollectionReport> {
    let mut samples_written = match &snapshot {
        Some(snapshot) => metrics::record_snapshot(db, snapshot, now).await?,
        None => 0,
    };
    let mut samples = metrics::service_samples(&services);
    samples.extend(metrics::game_server_samples(&game_servers));
    samples_written += metrics::record_samples(db, &samples, now).await?;

    let rules = alerts::rules_for(settings);
    let (alerts_opened, alerts_resolved) = alerts::evaluate_all(db, &rules, now).await?;

    Ok(CollectionReport {
        snapshot,
        services,
        game_servers,
        samples_written,
        alerts_opened,
        alerts_resolved,
    })
}

/// Runs every collector, stores the results and evaluates alerts.
///
/// A failing collector is logged and skipped; only database errors abort the pass.
pub async fn collect_and_store(
    db: &DatabaseConnection,
    settings: &Settings,
) -> Result<CollectionReport> {
    let monitoring = &settings.monitoring;

    let snapshot = match system::collect_snapshot(&monitoring.disk_path).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("System collector failed: {e}");
            None
        }
    };

    let services = services::service_statuses(&monitoring.services)
        .await
        .unwrap_or_else(|e| {
            warn!("Service collector failed: {e}");
            Vec::new()
        });

    let game_servers =
        game_servers::probe_all(&settings.game_servers, monitoring.probe_timeout()).await;

    let report = store_and_evaluate(db, settings, snapshot, services, game_servers, Utc::now())
        .await?;
    debug!(
        "Collected {} samples ({} alerts opened, {} resolved)",
        report.samples_written, report.alerts_opened, report.alerts_resolved
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Alert;
    use crate::test_utils::{sample_snapshot, setup_test_db};
    use sea_orm::{EntityTrait, PaginatorTrait};
    use services::ServiceState;

    #[tokio::test]
    async fn test_run_command_captures_stdout() -> Result<()> {
        let output = run_command("echo", &["hello"]).await?;
        assert_eq!(output.trim(), "hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_run_command_reports_failures() {
        let missing = run_command("definitely-not-a-real-binary", &[]).await;
        assert!(matches!(missing, Err(Error::Collector { .. })));

        let failing = run_command("false", &[]).await;
        assert!(matches!(failing, Err(Error::Collector { .. })));
    }

    #[tokio::test]
    async fn test_store_and_evaluate_opens_alerts() -> Result<()> {
        let db = setup_test_db().await?;
        let mut settings = Settings::default();
        settings.monitoring.services = vec!["nginx".to_string()];

        let services = vec![ServiceStatus {
            name: "nginx".to_string(),
            state: ServiceState::Missing,
            detail: String::new(),
        }];
        let report = store_and_evaluate(
            &db,
            &settings,
            Some(sample_snapshot(95.0)),
            services,
            Vec::new(),
            Utc::now(),
        )
        .await?;

        assert_eq!(report.samples_written, 8);
        // CPU above 90% and nginx down
        assert_eq!(report.alerts_opened, 2);
        assert_eq!(Alert::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_without_snapshot_still_records_services() -> Result<()> {
        let db = setup_test_db().await?;
        let report = store_and_evaluate(
            &db,
            &Settings::default(),
            None,
            Vec::new(),
            Vec::new(),
            Utc::now(),
        )
        .await?;
        assert_eq!(report.samples_written, 0);
        assert_eq!(report.alerts_opened, 0);
        Ok(())
    }
}
