//! Monitoring commands - live system status, services, game servers and alerts.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            Context, dashboards,
            render::{info_embed, success_embed},
        },
        core::{
            audit,
            dashboard::DashboardKind,
            format::{
                MESSAGE_LIMIT, fit_lines, format_bytes, format_duration, status_emoji, usage_emoji,
            },
            monitoring::{
                alerts::{self, Severity},
                game_servers, services, system,
            },
        },
        errors::Result,
    };
    use std::fmt::Write;

    /// Shows CPU, memory, disk, load and uptime of the host right now.
    #[poise::command(slash_command, prefix_command)]
    pub async fn status(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let settings = &ctx.data().settings.monitoring;
        let snapshot = system::collect_snapshot(&settings.disk_path).await?;

        let memory_percent = snapshot.memory.used_percent();
        let disk_percent = snapshot.disk.used_percent();
        let mut processes = String::new();
        for process in &snapshot.top_processes {
            writeln!(
                &mut processes,
                "`{}` {:.1}% CPU, {:.1}% mem",
                process.command, process.cpu_percent, process.mem_percent
            )?;
        }
        if processes.is_empty() {
            processes.push('-');
        }

        let embed = info_embed("🖥️ **System status**")
            .field(
                "CPU",
                format!(
                    "{} {:.1}%",
                    usage_emoji(snapshot.cpu_percent, settings.cpu_alert_percent),
                    snapshot.cpu_percent
                ),
                true,
            )
            .field(
                "Memory",
                format!(
                    "{} {:.1}% ({} / {})",
                    usage_emoji(memory_percent, settings.memory_alert_percent),
                    memory_percent,
                    format_bytes(snapshot.memory.used_bytes()),
                    format_bytes(snapshot.memory.total_bytes)
                ),
                true,
            )
            .field(
                "Disk",
                format!(
                    "{} {:.1}% of {} ({})",
                    usage_emoji(disk_percent, settings.disk_alert_percent),
                    disk_percent,
                    format_bytes(snapshot.disk.total_bytes),
                    snapshot.disk.mount
                ),
                true,
            )
            .field(
                "Load",
                format!(
                    "{:.2} / {:.2} / {:.2}",
                    snapshot.load.one, snapshot.load.five, snapshot.load.fifteen
                ),
                true,
            )
            .field("Uptime", format_duration(snapshot.uptime_secs), true)
            .field("Top processes", processes, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the state of every monitored docker service.
    #[poise::command(slash_command, prefix_command)]
    pub async fn services(ctx: Context<'_>) -> Result<()> {
        let configured = &ctx.data().settings.monitoring.services;
        if configured.is_empty() {
            ctx.say("🐳 No services are configured for monitoring.").await?;
            return Ok(());
        }

        ctx.defer().await?;
        let statuses = services::service_statuses(configured).await?;

        let mut response = String::from("🐳 **Services**\n\n");
        for service in &statuses {
            write!(
                &mut response,
                "{} **{}** {}",
                status_emoji(service.state.is_up()),
                service.name,
                service.state.label()
            )?;
            if !service.detail.is_empty() {
                write!(&mut response, " ({})", service.detail)?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(fit_lines(&response, MESSAGE_LIMIT)).await?;
        Ok(())
    }

    /// Probes every configured game server.
    #[poise::command(slash_command, prefix_command)]
    pub async fn gameservers(ctx: Context<'_>) -> Result<()> {
        let settings = &ctx.data().settings;
        if settings.game_servers.is_empty() {
            ctx.say("🎮 No game servers are configured.").await?;
            return Ok(());
        }

        ctx.defer().await?;
        let statuses =
            game_servers::probe_all(&settings.game_servers, settings.monitoring.probe_timeout())
                .await;

        let mut response = String::from("🎮 **Game servers**\n\n");
        for server in &statuses {
            write!(
                &mut response,
                "{} **{}** ({}) `{}`",
                status_emoji(server.online),
                server.name,
                server.game,
                server.address
            )?;
            match server.latency_ms {
                Some(latency) if server.online => writeln!(&mut response, " {latency} ms")?,
                _ => writeln!(&mut response, " offline")?,
            }
        }

        ctx.say(fit_lines(&response, MESSAGE_LIMIT)).await?;
        Ok(())
    }

    /// Lists unresolved alerts.
    #[poise::command(slash_command, prefix_command)]
    pub async fn alerts(ctx: Context<'_>) -> Result<()> {
        let open = alerts::open_alerts(&ctx.data().database).await?;

        if open.is_empty() {
            ctx.say("✅ No open alerts.").await?;
            return Ok(());
        }

        let mut response = String::from("🚨 **Open alerts**\n\n");
        for alert in &open {
            writeln!(
                &mut response,
                "{} `#{}` {} (since {})",
                Severity::emoji_for(&alert.severity),
                alert.id,
                alert.message,
                alert.created_at.format("%Y-%m-%d %H:%M UTC")
            )?;
        }

        ctx.say(fit_lines(&response, MESSAGE_LIMIT)).await?;
        Ok(())
    }

    /// Marks an alert as resolved.
    #[poise::command(
        slash_command,
        guild_only,
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn resolve_alert(
        ctx: Context<'_>,
        #[description = "Alert ID"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();
        let resolved = alerts::resolve_alert(&data.database, id).await?;
        let guild = ctx.guild_id().map(|g| g.to_string());

        audit::log_action(
            &data.database,
            guild.as_deref(),
            &ctx.author().id.to_string(),
            "alert_resolve",
            format!("#{} {}", resolved.id, resolved.metric_name),
        )
        .await?;

        if let Some(guild) = &guild {
            dashboards::refresh_if_posted(ctx.http(), data, guild, DashboardKind::Monitoring)
                .await;
        }

        ctx.send(
            poise::CreateReply::default()
                .embed(success_embed(format!("✅ Resolved alert `#{}`.", resolved.id))),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
