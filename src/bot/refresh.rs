//! Background refresh loop.
//!
//! Every `refresh_interval_secs` the loop collects monitoring data, prunes stale rows
//! and re-renders every posted dashboard. One failing step is logged and the rest of
//! the cycle continues.

use super::{BotData, dashboards};
use crate::core::{monitoring, sessions};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sleeps, then runs a refresh cycle, forever.
pub async fn refresh_loop(http: Arc<serenity::Http>, data: BotData) {
    let interval = data.settings.refresh_interval();
    info!("Dashboard refresh loop started ({}s interval)", interval.as_secs());
    loop {
        tokio::time::sleep(interval).await;
        run_cycle(&http, &data).await;
    }
}

/// One collection, housekeeping and refresh pass.
pub async fn run_cycle(http: &serenity::Http, data: &BotData) {
    if let Err(e) = monitoring::collect_and_store(&data.database, &data.settings).await {
        error!("Monitoring collection failed: {e}");
    }
    housekeeping(data).await;
    refresh_all(http, data).await;
}

async fn housekeeping(data: &BotData) {
    let db = &data.database;
    let now = Utc::now();

    let cutoff = data
        .settings
        .monitoring
        .metric_retention()
        .and_then(|retention| now.checked_sub_signed(retention));
    match cutoff {
        Some(cutoff) => match monitoring::metrics::prune_metrics(db, cutoff).await {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {removed} old metric samples"),
            Err(e) => warn!("Could not prune metrics: {e}"),
        },
        None => warn!("Metric retention is out of range, skipping pruning"),
    }

    match sessions::purge_expired(db, now).await {
        Ok(0) => {}
        Ok(removed) => debug!("Purged {removed} expired sessions"),
        Err(e) => warn!("Could not purge sessions: {e}"),
    }

    let dropped = data.limiter.prune(Instant::now());
    if dropped > 0 {
        debug!(
            "Dropped {dropped} idle rate limit windows, {} still tracked",
            data.limiter.tracked_keys()
        );
    }
}

/// Re-renders every dashboard in the registry.
pub async fn refresh_all(http: &serenity::Http, data: &BotData) {
    for (guild_id, kind, location) in data.registry.entries() {
        if let Err(e) = dashboards::refresh_dashboard(http, data, &guild_id, kind, location).await {
            warn!("Could not refresh {kind} dashboard in guild {guild_id}: {e}");
        }
    }
}
