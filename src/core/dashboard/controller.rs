//! Dashboard controllers - Gather data for a dashboard kind and render it, and
//! answer button clicks.

use super::{
    ButtonAction, DashboardKind, DashboardView, REFRESH_ACTION, ViewButton,
    render::{self, GameServerLine, MonitoringData, SystemOverview, WelcomeStats},
    repository,
};
use crate::{
    config::Settings,
    core::{
        monitoring::{
            alerts,
            metrics::{self, game_latency_metric, game_online_metric, service_up_metric},
            system,
        },
        format::{MESSAGE_LIMIT, fit_lines},
        projects::{self, ProjectStatus, TaskStatus},
        users,
    },
    entities::metric,
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, fmt::Write};
use tracing::warn;

/// Overview of the slash commands, shared by `/help` and the welcome Help button.
pub const HELP_TEXT: &str = "**Homelab Bot Help**\n\n\
    **Dashboards**\n\
    • `/dashboard create <kind>` - Posts a live dashboard in this channel.\n\
    • `/dashboard refresh|remove|list` - Manages posted dashboards.\n\
    • `/dashboard button <kind> <action> <enabled>` - Shows or hides a dashboard button.\n\n\
    **Monitoring**\n\
    • `/status`, `/services`, `/gameservers` - Current host, container and game server state.\n\
    • `/alerts`, `/resolve_alert <id>` - Open alerts.\n\n\
    **Projects**\n\
    • `/project create|list|status|delete` - Manage projects.\n\
    • `/task add|start|done|list` - Manage a project's tasks.\n\n\
    **Account**\n\
    • `/session start|show|revoke` - Personal access token.\n\n\
    **Admin**\n\
    • `/setup`, `/audit`, `/ratelimits`, `/admin grant|revoke`\n\n\
    • `/ping` - Checks if the bot is responsive.";

/// How the bot should answer a dashboard button click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResponse {
    /// Replace the dashboard message with this view
    Refresh(DashboardView),
    /// Reply privately to the clicker
    Ephemeral(String),
}

/// Builds the current view of a guild's dashboard.
///
/// Buttons come from the dashboard's enabled components; a guild that has not created
/// the dashboard yet gets the default buttons.
pub async fn build_view(
    db: &DatabaseConnection,
    settings: &Settings,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<DashboardView> {
    let view = match kind {
        DashboardKind::Welcome => {
            let stats = WelcomeStats {
                members_seen: users::count_users(db).await?,
                projects: projects::list_projects(db, guild_id).await?.len(),
                game_servers: settings.game_servers.len(),
            };
            render::render_welcome(&settings.welcome, stats)
        }
        DashboardKind::Monitoring => {
            let data = monitoring_data(db, settings).await?;
            render::render_monitoring(&data, &settings.monitoring)
        }
        DashboardKind::Project => {
            render::render_projects(&projects::project_summaries(db, guild_id).await?)
        }
        DashboardKind::GameHub => {
            let (servers, updated_at) = game_server_lines(db, settings).await?;
            render::render_gamehub(&servers, updated_at)
        }
    };

    let buttons = dashboard_buttons(db, guild_id, kind).await?;
    Ok(buttons
        .into_iter()
        .fold(view, DashboardView::button)
        .fit_to_limits())
}

async fn dashboard_buttons(
    db: &DatabaseConnection,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<Vec<ViewButton>> {
    let Some(dashboard) = repository::get_dashboard(db, guild_id, kind).await? else {
        return Ok(kind
            .default_buttons()
            .iter()
            .map(|b| ViewButton {
                action: ButtonAction::new(kind, b.action),
                label: b.label.to_string(),
                style: b.style,
            })
            .collect());
    };

    Ok(repository::components(db, dashboard.id)
        .await?
        .into_iter()
        .filter(|c| c.is_enabled)
        .map(|c| ViewButton {
            style: repository::component_style(&c),
            action: ButtonAction::new(kind, c.action),
            label: c.label,
        })
        .collect())
}

fn newest(current: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(current.map_or(candidate, |c| c.max(candidate)))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u64(value: f64) -> u64 {
    value.max(0.0) as u64
}

async fn latest_value(
    db: &DatabaseConnection,
    name: &str,
    updated_at: &mut Option<DateTime<Utc>>,
) -> Result<Option<f64>> {
    let sample = metrics::latest_metric(db, name).await?;
    Ok(sample.map(|s| {
        *updated_at = newest(*updated_at, s.recorded_at);
        s.value
    }))
}

/// Latest monitoring samples, as shown on the monitoring dashboard.
pub async fn monitoring_data(db: &DatabaseConnection, settings: &Settings) -> Result<MonitoringData> {
    let mut updated_at = None;
    let at = &mut updated_at;

    let system = SystemOverview {
        cpu_percent: latest_value(db, metrics::CPU_PERCENT, at).await?,
        memory_percent: latest_value(db, metrics::MEMORY_PERCENT, at).await?,
        memory_used_bytes: latest_value(db, metrics::MEMORY_USED_BYTES, at)
            .await?
            .map(as_u64),
        memory_total_bytes: latest_value(db, metrics::MEMORY_TOTAL_BYTES, at)
            .await?
            .map(as_u64),
        disk_percent: latest_value(db, metrics::DISK_PERCENT, at).await?,
        load_1: latest_value(db, metrics::LOAD_1, at).await?,
        uptime_secs: latest_value(db, metrics::UPTIME_SECS, at).await?.map(as_u64),
    };

    let latest: HashMap<String, metric::Model> =
        metrics::latest_metrics_with_prefix(db, metrics::SERVICE_PREFIX)
            .await?
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();
    let services = settings
        .monitoring
        .services
        .iter()
        .map(|name| {
            let sample = latest.get(&service_up_metric(name));
            if let Some(sample) = sample {
                *at = newest(*at, sample.recorded_at);
            }
            (name.clone(), sample.is_some_and(|s| s.value >= 1.0))
        })
        .collect();

    Ok(MonitoringData {
        system,
        services,
        open_alerts: alerts::open_alerts(db).await?,
        updated_at,
    })
}

/// Latest probe results for every configured game server.
pub async fn game_server_lines(
    db: &DatabaseConnection,
    settings: &Settings,
) -> Result<(Vec<GameServerLine>, Option<DateTime<Utc>>)> {
    let mut updated_at = None;
    let mut lines = Vec::with_capacity(settings.game_servers.len());

    for server in &settings.game_servers {
        let online = metrics::latest_metric(db, &game_online_metric(&server.name)).await?;
        if let Some(sample) = &online {
            updated_at = newest(updated_at, sample.recorded_at);
        }
        let online = online.map(|s| s.value >= 1.0);
        let latency_ms = if online == Some(true) {
            metrics::latest_metric(db, &game_latency_metric(&server.name))
                .await?
                .map(|s| s.value)
        } else {
            None
        };

        lines.push(GameServerLine {
            name: server.name.clone(),
            game: server.game.clone(),
            address: server.address(),
            online,
            latency_ms,
        });
    }

    Ok((lines, updated_at))
}

const UNAVAILABLE: &str = "This button is no longer available.";

/// Works out the answer to a dashboard button click.
pub async fn handle_action(
    db: &DatabaseConnection,
    settings: &Settings,
    guild_id: &str,
    action: &ButtonAction,
) -> Result<ActionResponse> {
    if let Some(dashboard) = repository::get_dashboard(db, guild_id, action.kind).await? {
        let enabled = repository::components(db, dashboard.id)
            .await?
            .iter()
            .any(|c| c.action == action.action && c.is_enabled);
        if !enabled || !dashboard.is_active {
            return Ok(ActionResponse::Ephemeral(UNAVAILABLE.to_string()));
        }
    }

    if action.action == REFRESH_ACTION {
        let view = build_view(db, settings, guild_id, action.kind).await?;
        return Ok(ActionResponse::Refresh(view));
    }

    let text = match (action.kind, action.action.as_str()) {
        (DashboardKind::Welcome, "rules") => rules_text(settings)?,
        (DashboardKind::Welcome, "help") => HELP_TEXT.to_string(),
        (DashboardKind::Monitoring, "processes") => processes_text().await?,
        (DashboardKind::Monitoring, "alerts") => alerts_text(db).await?,
        (DashboardKind::Project, "active") => active_projects_text(db, guild_id).await?,
        (DashboardKind::GameHub, "details") => connection_text(db, settings).await?,
        _ => UNAVAILABLE.to_string(),
    };
    Ok(ActionResponse::Ephemeral(fit_lines(&text, MESSAGE_LIMIT)))
}

fn rules_text(settings: &Settings) -> Result<String> {
    if settings.welcome.rules.is_empty() {
        return Ok("No rules have been configured.".to_string());
    }
    let mut text = "**Server rules**\n".to_string();
    for (i, rule) in settings.welcome.rules.iter().enumerate() {
        writeln!(text, "{}. {rule}", i + 1)?;
    }
    Ok(text)
}

async fn processes_text() -> Result<String> {
    let processes = match system::top_processes(10).await {
        Ok(processes) => processes,
        Err(e) => {
            warn!("Could not list processes: {e}");
            return Ok("Could not list processes right now.".to_string());
        }
    };
    if processes.is_empty() {
        return Ok("No processes reported.".to_string());
    }

    let mut text = "**Top processes by CPU**\n```\n".to_string();
    for p in processes {
        writeln!(
            text,
            "{:<20} {:>5.1}% cpu {:>5.1}% mem",
            p.command, p.cpu_percent, p.mem_percent
        )?;
    }
    text.push_str("```");
    Ok(text)
}

async fn alerts_text(db: &DatabaseConnection) -> Result<String> {
    let open = alerts::open_alerts(db).await?;
    if open.is_empty() {
        return Ok("✅ No open alerts.".to_string());
    }
    let mut text = format!("**{} open alerts**\n", open.len());
    for alert in open {
        writeln!(
            text,
            "{} `#{}` {} (since {})",
            alerts::Severity::emoji_for(&alert.severity),
            alert.id,
            alert.message,
            alert.created_at.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    Ok(text)
}

async fn active_projects_text(db: &DatabaseConnection, guild_id: &str) -> Result<String> {
    let active: Vec<_> = projects::list_projects(db, guild_id)
        .await?
        .into_iter()
        .filter(|p| p.status == ProjectStatus::Active.as_str())
        .collect();
    if active.is_empty() {
        return Ok("No active projects.".to_string());
    }

    let mut text = String::new();
    for project in active {
        writeln!(text, "**{}**", project.name)?;
        let open_tasks: Vec<_> = projects::list_tasks(db, project.id)
            .await?
            .into_iter()
            .filter(|t| t.status != TaskStatus::Done.as_str())
            .collect();
        if open_tasks.is_empty() {
            text.push_str("  No open tasks\n");
        }
        for task in open_tasks {
            let status = task.status.parse().unwrap_or(TaskStatus::Todo);
            writeln!(text, "  {} `#{}` {}", status.marker(), task.id, task.title)?;
        }
    }
    Ok(text)
}

async fn connection_text(db: &DatabaseConnection, settings: &Settings) -> Result<String> {
    let (servers, _) = game_server_lines(db, settings).await?;
    if servers.is_empty() {
        return Ok("No game servers configured.".to_string());
    }
    let mut text = "**Connection info**\n".to_string();
    for server in servers {
        writeln!(text, "• **{}**: `{}`", server.name, server.address)?;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::settings::GameServerConfig;
    use crate::test_utils::{create_test_project, setup_test_db};

    fn settings_with_game_server() -> Settings {
        let mut settings = Settings::default();
        settings.game_servers = vec![GameServerConfig {
            name: "mc".to_string(),
            game: "Minecraft".to_string(),
            host: "10.0.0.5".to_string(),
            port: 25565,
        }];
        settings
    }

    #[tokio::test]
    async fn test_build_view_uses_default_buttons_before_creation() -> Result<()> {
        let db = setup_test_db().await?;
        let view = build_view(&db, &Settings::default(), "g1", DashboardKind::Monitoring).await?;
        assert_eq!(view.buttons.len(), 3);
        assert_eq!(view.buttons[0].action.custom_id(), "dash:monitoring:refresh");
        Ok(())
    }

    #[tokio::test]
    async fn test_build_view_skips_disabled_buttons() -> Result<()> {
        let db = setup_test_db().await?;
        let dashboard = repository::ensure_dashboard(&db, "g1", DashboardKind::GameHub).await?;
        repository::set_component_enabled(&db, dashboard.id, "details", false).await?;

        let view = build_view(&db, &Settings::default(), "g1", DashboardKind::GameHub).await?;
        assert_eq!(view.buttons.len(), 1);
        assert_eq!(view.buttons[0].action.action, REFRESH_ACTION);
        Ok(())
    }

    #[tokio::test]
    async fn test_monitoring_view_reads_latest_metrics() -> Result<()> {
        let db = setup_test_db().await?;
        let mut settings = Settings::default();
        settings.monitoring.services = vec!["nginx".to_string()];
        let now = Utc::now();
        metrics::record_metric(&db, metrics::CPU_PERCENT, 42.0, "%", now).await?;
        metrics::record_metric(&db, &service_up_metric("nginx"), 1.0, "bool", now).await?;

        let data = monitoring_data(&db, &settings).await?;
        assert_eq!(data.system.cpu_percent, Some(42.0));
        assert!(data.system.disk_percent.is_none());
        assert_eq!(data.services, vec![("nginx".to_string(), true)]);
        assert!(data.updated_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_game_server_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = settings_with_game_server();

        let (lines, updated) = game_server_lines(&db, &settings).await?;
        assert_eq!(lines[0].online, None);
        assert!(updated.is_none());

        let now = Utc::now();
        metrics::record_metric(&db, &game_online_metric("mc"), 1.0, "bool", now).await?;
        metrics::record_metric(&db, &game_latency_metric("mc"), 15.0, "ms", now).await?;
        let (lines, _) = game_server_lines(&db, &settings).await?;
        assert_eq!(lines[0].online, Some(true));
        assert_eq!(lines[0].latency_ms, Some(15.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_project_view_lists_projects() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_project(&db, "g1", "nas").await?;
        create_test_project(&db, "g2", "other-guild").await?;

        let view = build_view(&db, &Settings::default(), "g1", DashboardKind::Project).await?;
        assert_eq!(view.fields.len(), 1);
        assert_eq!(view.fields[0].name, "nas");
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_refresh_and_text_actions() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = settings_with_game_server();

        let refresh = ButtonAction::new(DashboardKind::GameHub, REFRESH_ACTION);
        assert!(matches!(
            handle_action(&db, &settings, "g1", &refresh).await?,
            ActionResponse::Refresh(_)
        ));

        let details = ButtonAction::new(DashboardKind::GameHub, "details");
        let ActionResponse::Ephemeral(text) = handle_action(&db, &settings, "g1", &details).await?
        else {
            panic!("expected an ephemeral reply");
        };
        assert!(text.contains("10.0.0.5:25565"));

        let rules = ButtonAction::new(DashboardKind::Welcome, "rules");
        let ActionResponse::Ephemeral(text) = handle_action(&db, &settings, "g1", &rules).await?
        else {
            panic!("expected an ephemeral reply");
        };
        assert!(text.contains("1. Be nice."));
        Ok(())
    }

    #[tokio::test]
    async fn test_active_projects_reply_fits_message_limit() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_test_project(&db, "g1", "big").await?;
        for i in 0..150 {
            let title = format!("task number {i} with a longish title");
            projects::add_task(&db, project.id, &title, None).await?;
        }

        let active = ButtonAction::new(DashboardKind::Project, "active");
        let ActionResponse::Ephemeral(text) =
            handle_action(&db, &Settings::default(), "g1", &active).await?
        else {
            panic!("expected an ephemeral reply");
        };
        assert!(text.chars().count() <= MESSAGE_LIMIT);
        assert!(text.starts_with("**big**"));
        assert!(text.lines().last().unwrap().ends_with(" more"));
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_disabled_or_unknown_action() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = Settings::default();
        let dashboard = repository::ensure_dashboard(&db, "g1", DashboardKind::Monitoring).await?;
        repository::set_component_enabled(&db, dashboard.id, "alerts", false).await?;

        let alerts = ButtonAction::new(DashboardKind::Monitoring, "alerts");
        assert_eq!(
            handle_action(&db, &settings, "g1", &alerts).await?,
            ActionResponse::Ephemeral(UNAVAILABLE.to_string())
        );

        let unknown = ButtonAction::new(DashboardKind::Project, "launch");
        assert_eq!(
            handle_action(&db, &settings, "g2", &unknown).await?,
            ActionResponse::Ephemeral(UNAVAILABLE.to_string())
        );
        Ok(())
    }
}
