//! Dashboard renderers - Pure functions from collected data to a [`DashboardView`].
//!
//! Buttons are attached afterwards by the controller, from the stored components.

use super::{DashboardKind, DashboardView};
use crate::{
    config::settings::{MonitoringSettings, WelcomeSettings},
    core::{
        format::{format_bytes, format_duration, format_progress_bar, status_emoji, usage_emoji},
        monitoring::alerts::Severity,
        projects::ProjectSummary,
    },
    entities::alert,
};
use chrono::{DateTime, Utc};

/// Counts shown on the welcome dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WelcomeStats {
    /// Members the bot has seen
    pub members_seen: u64,
    /// Projects in the guild
    pub projects: usize,
    /// Configured game servers
    pub game_servers: usize,
}

/// Latest host metrics; `None` when no sample exists yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemOverview {
    /// CPU usage percent
    pub cpu_percent: Option<f64>,
    /// Memory usage percent
    pub memory_percent: Option<f64>,
    /// Memory in use
    pub memory_used_bytes: Option<u64>,
    /// Total memory
    pub memory_total_bytes: Option<u64>,
    /// Disk usage percent
    pub disk_percent: Option<f64>,
    /// 1 minute load average
    pub load_1: Option<f64>,
    /// Seconds since boot
    pub uptime_secs: Option<u64>,
}

/// Everything the monitoring dashboard shows.
#[derive(Debug, Clone, Default)]
pub struct MonitoringData {
    /// Host metrics
    pub system: SystemOverview,
    /// `(service name, is up)`
    pub services: Vec<(String, bool)>,
    /// Unresolved alerts, newest first
    pub open_alerts: Vec<alert::Model>,
    /// When the newest sample was recorded
    pub updated_at: Option<DateTime<Utc>>,
}

/// One row of the game hub.
#[derive(Debug, Clone, PartialEq)]
pub struct GameServerLine {
    /// Configured name
    pub name: String,
    /// Game title
    pub game: String,
    /// `host:port`
    pub address: String,
    /// Last probe result; `None` if never probed
    pub online: Option<bool>,
    /// Last connect latency
    pub latency_ms: Option<f64>,
}

const NO_DATA: &str = "No data yet";

fn updated_footer(updated_at: Option<DateTime<Utc>>) -> String {
    updated_at.map_or_else(
        || "Waiting for the first collection".to_string(),
        |at| format!("Last updated {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
    )
}

/// Greeting, rules summary and a few counts.
#[must_use]
pub fn render_welcome(settings: &WelcomeSettings, stats: WelcomeStats) -> DashboardView {
    let kind = DashboardKind::Welcome;
    let rules = if settings.rules.is_empty() {
        "No rules configured.".to_string()
    } else {
        settings
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {rule}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };

    DashboardView::new(kind.title(), kind.color())
        .description(settings.render_message("everyone"))
        .field("📜 Rules", rules, false)
        .field("👥 Members", stats.members_seen.to_string(), true)
        .field("📋 Projects", stats.projects.to_string(), true)
        .field("🎮 Game servers", stats.game_servers.to_string(), true)
        .footer("Use /help to see what the bot can do")
}

fn usage_line(percent: Option<f64>, threshold: f64) -> String {
    percent.map_or_else(
        || NO_DATA.to_string(),
        |p| format!("{} {}", usage_emoji(p, threshold), format_progress_bar(p, None)),
    )
}

/// Host usage bars, service states and open alerts.
#[must_use]
pub fn render_monitoring(data: &MonitoringData, thresholds: &MonitoringSettings) -> DashboardView {
    let kind = DashboardKind::Monitoring;
    let system = &data.system;

    let usage = usage_line(system.memory_percent, thresholds.memory_alert_percent);
    let memory = match (system.memory_used_bytes, system.memory_total_bytes) {
        (Some(used), Some(total)) => {
            format!("{usage}\n{} / {}", format_bytes(used), format_bytes(total))
        }
        _ => usage,
    };

    let load = system
        .load_1
        .map_or_else(|| NO_DATA.to_string(), |l| format!("{l:.2}"));
    let uptime = system
        .uptime_secs
        .map_or_else(|| NO_DATA.to_string(), format_duration);

    let services = if data.services.is_empty() {
        "No services configured.".to_string()
    } else {
        data.services
            .iter()
            .map(|(name, up)| format!("{} {name}", status_emoji(*up)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let alerts = if data.open_alerts.is_empty() {
        "✅ All clear".to_string()
    } else {
        data.open_alerts
            .iter()
            .map(|a| format!("{} #{} {}", Severity::emoji_for(&a.severity), a.id, a.message))
            .collect::<Vec<_>>()
            .join("\n")
    };

    DashboardView::new(kind.title(), kind.color())
        .description(format!("Disk usage is reported for `{}`.", thresholds.disk_path))
        .field(
            "🖥️ CPU",
            usage_line(system.cpu_percent, thresholds.cpu_alert_percent),
            false,
        )
        .field("🧠 Memory", memory, false)
        .field(
            "💾 Disk",
            usage_line(system.disk_percent, thresholds.disk_alert_percent),
            false,
        )
        .field("📈 Load (1m)", load, true)
        .field("⏱️ Uptime", uptime, true)
        .field("🐳 Services", services, false)
        .field(
            format!("🚨 Open alerts ({})", data.open_alerts.len()),
            alerts,
            false,
        )
        .footer(updated_footer(data.updated_at))
}

/// One field per project with status, task counts and a progress bar.
///
/// Projects that do not fit Discord's embed limits are counted in the footer.
#[must_use]
pub fn render_projects(summaries: &[ProjectSummary]) -> DashboardView {
    let kind = DashboardKind::Project;
    let mut view = DashboardView::new(kind.title(), kind.color());

    if summaries.is_empty() {
        return view
            .description("No projects yet. Create one with `/project create`.")
            .footer("0 projects");
    }

    for summary in summaries {
        let counts = format!(
            "{} {} · {} todo · {} in progress · {} done",
            summary.status.emoji(),
            summary.status,
            summary.todo,
            summary.in_progress,
            summary.done
        );
        let bar = format_progress_bar(summary.completion_percent(), None);
        let value = if summary.project.description.is_empty() {
            format!("{counts}\n{bar}")
        } else {
            format!("{}\n{counts}\n{bar}", summary.project.description)
        };
        view = view.field(&summary.project.name, value, false);
    }

    view.footer(format!("{} projects", summaries.len())).fit_to_limits()
}

/// One inline field per game server.
#[must_use]
pub fn render_gamehub(servers: &[GameServerLine], updated_at: Option<DateTime<Utc>>) -> DashboardView {
    let kind = DashboardKind::GameHub;
    let view = DashboardView::new(kind.title(), kind.color());

    if servers.is_empty() {
        return view
            .description("No game servers configured. Add `[[game_servers]]` entries to config.toml.")
            .footer(updated_footer(updated_at));
    }

    let online = servers.iter().filter(|s| s.online == Some(true)).count();
    let mut view = view.description(format!("{online}/{} servers online", servers.len()));
    for server in servers {
        let state = match (server.online, server.latency_ms) {
            (Some(true), Some(latency)) => format!("🟢 Online ({latency:.0} ms)"),
            (Some(true), None) => "🟢 Online".to_string(),
            (Some(false), _) => "🔴 Offline".to_string(),
            (None, _) => "⚪ Unknown".to_string(),
        };
        let game = if server.game.is_empty() {
            String::new()
        } else {
            format!("{}\n", server.game)
        };
        view = view.field(&server.name, format!("{game}{state}"), true);
    }
    view.footer(updated_footer(updated_at))
}
