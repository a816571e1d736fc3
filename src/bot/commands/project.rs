//! Project and task commands.
//!
//! Every change refreshes the project dashboard if it is posted, so the embed never
//! lags behind the database for longer than one command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, dashboards, handlers::autocomplete, render::success_embed},
        core::{
            audit,
            dashboard::DashboardKind,
            format::{MESSAGE_LIMIT, fit_lines, format_progress_bar},
            projects::{self, ProjectStatus, TaskStatus},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn guild_id(ctx: Context<'_>) -> Result<String> {
        ctx.guild_id()
            .map(|id| id.to_string())
            .ok_or_else(|| Error::validation("This command only works inside a server."))
    }

    async fn after_change(ctx: Context<'_>, guild: &str) {
        dashboards::refresh_if_posted(ctx.http(), ctx.data(), guild, DashboardKind::Project)
            .await;
    }

    async fn reply_success(ctx: Context<'_>, message: impl Into<String>) -> Result<()> {
        ctx.send(poise::CreateReply::default().embed(success_embed(message)))
            .await?;
        Ok(())
    }

    /// Track homelab projects.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("project_create", "project_list", "project_status", "project_delete"),
        subcommand_required
    )]
    pub async fn project(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Creates a new project.
    #[poise::command(slash_command, guild_only, rename = "create")]
    pub async fn project_create(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[max_length = 100]
        name: String,
        #[description = "Short description"]
        #[max_length = 300]
        description: Option<String>,
    ) -> Result<()> {
        let guild = guild_id(ctx)?;
        let db = &ctx.data().database;
        let author = ctx.author().id.to_string();

        let created = projects::create_project(
            db,
            &guild,
            &name,
            description.as_deref().unwrap_or_default(),
            &author,
        )
        .await?;
        audit::log_action(db, Some(&guild), &author, "project_create", &created.name).await?;

        after_change(ctx, &guild).await;
        reply_success(ctx, format!("📝 Created project **{}**.", created.name)).await
    }

    /// Lists the projects of this server with their progress.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn project_list(ctx: Context<'_>) -> Result<()> {
        let guild = guild_id(ctx)?;
        let summaries = projects::project_summaries(&ctx.data().database, &guild).await?;

        if summaries.is_empty() {
            ctx.say("📋 No projects yet. Create one with `/project create`.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📋 **Projects**\n\n");
        for summary in &summaries {
            writeln!(
                &mut response,
                "{} **{}** ({}) {} - {}/{} tasks done",
                summary.status.emoji(),
                summary.project.name,
                summary.status,
                format_progress_bar(summary.completion_percent(), Some(8)),
                summary.done,
                summary.total()
            )?;
        }

        ctx.say(fit_lines(&response, MESSAGE_LIMIT)).await?;
        Ok(())
    }

    /// Changes a project's status.
    #[poise::command(slash_command, guild_only, rename = "status")]
    pub async fn project_status(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        name: String,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_project_status"]
        status: String,
    ) -> Result<()> {
        let guild = guild_id(ctx)?;
        let status: ProjectStatus = status.parse()?;
        let updated =
            projects::update_project_status(&ctx.data().database, &guild, &name, status).await?;

        after_change(ctx, &guild).await;
        reply_success(
            ctx,
            format!("{} **{}** is now {status}.", status.emoji(), updated.name),
        )
        .await
    }

    /// Deletes a project and all of its tasks.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "delete",
        check = "crate::bot::checks::admin_check"
    )]
    pub async fn project_delete(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        name: String,
    ) -> Result<()> {
        let guild = guild_id(ctx)?;
        let db = &ctx.data().database;
        let removed = projects::delete_project(db, &guild, &name).await?;
        audit::log_action(
            db,
            Some(&guild),
            &ctx.author().id.to_string(),
            "project_delete",
            format!("{name} ({removed} tasks)"),
        )
        .await?;

        after_change(ctx, &guild).await;
        reply_success(
            ctx,
            format!("🗑️ Deleted project **{name}** and {removed} task(s)."),
        )
        .await
    }

    /// Manage the tasks of a project.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("task_add", "task_start", "task_done", "task_list"),
        subcommand_required
    )]
    pub async fn task(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Adds a task to a project.
    #[poise::command(slash_command, guild_only, rename = "add")]
    pub async fn task_add(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        project: String,
        #[description = "What needs doing"]
        #[max_length = 200]
        title: String,
        #[description = "Who is doing it"] assignee: Option<serenity::User>,
    ) -> Result<()> {
        let guild = guild_id(ctx)?;
        let db = &ctx.data().database;
        let owner = projects::require_project(db, &guild, &project).await?;
        let created =
            projects::add_task(db, owner.id, &title, assignee.map(|u| u.id.to_string())).await?;

        after_change(ctx, &guild).await;
        reply_success(
            ctx,
            format!("⬜ Added task `#{}` to **{}**: {}", created.id, owner.name, created.title),
        )
        .await
    }

    async fn move_task(ctx: Context<'_>, task_id: i64, status: TaskStatus) -> Result<()> {
        let guild = guild_id(ctx)?;
        let (owner, updated) =
            projects::set_guild_task_status(&ctx.data().database, &guild, task_id, status).await?;

        after_change(ctx, &guild).await;
        reply_success(
            ctx,
            format!(
                "{} `#{}` {} ({}) is now {status}.",
                status.marker(),
                updated.id,
                updated.title,
                owner.name
            ),
        )
        .await
    }

    /// Marks a task as in progress.
    #[poise::command(slash_command, guild_only, rename = "start")]
    pub async fn task_start(
        ctx: Context<'_>,
        #[description = "Task ID"] task_id: i64,
    ) -> Result<()> {
        move_task(ctx, task_id, TaskStatus::InProgress).await
    }

    /// Marks a task as done.
    #[poise::command(slash_command, guild_only, rename = "done")]
    pub async fn task_done(
        ctx: Context<'_>,
        #[description = "Task ID"] task_id: i64,
    ) -> Result<()> {
        move_task(ctx, task_id, TaskStatus::Done).await
    }

    /// Lists the tasks of a project.
    #[poise::command(slash_command, guild_only, rename = "list")]
    pub async fn task_list(
        ctx: Context<'_>,
        #[description = "Project name"]
        #[autocomplete = "autocomplete::autocomplete_project_name"]
        project: String,
    ) -> Result<()> {
        let guild = guild_id(ctx)?;
        let db = &ctx.data().database;
        let owner = projects::require_project(db, &guild, &project).await?;
        let tasks = projects::list_tasks(db, owner.id).await?;

        let mut response = format!("📋 **{}**\n", owner.name);
        if tasks.is_empty() {
            response.push_str("_No tasks yet. Add one with `/task add`._");
        }
        for task in tasks {
            let status = task.status.parse().unwrap_or(TaskStatus::Todo);
            write!(&mut response, "{} `#{}` {}", status.marker(), task.id, task.title)?;
            if let Some(assignee) = &task.assignee {
                write!(&mut response, " (<@{assignee}>)")?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(fit_lines(&response, MESSAGE_LIMIT)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
