//! Project business logic - Projects and their tasks.
//!
//! Provides functions for creating, retrieving, updating and deleting projects and tasks,
//! plus per-project progress summaries for the project dashboard. Project names are unique
//! per guild (case-insensitive) and deleting a project removes its tasks in the same
//! database transaction.

use crate::{
    entities::{Project, Task, project, task},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::fmt;
use std::str::FromStr;

/// Longest accepted project name.
pub const MAX_NAME_CHARS: usize = 100;
/// Longest accepted project description, so a dashboard field stays readable.
pub const MAX_DESCRIPTION_CHARS: usize = 300;
/// Longest accepted task title.
pub const MAX_TASK_TITLE_CHARS: usize = 200;

/// Lifecycle of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Not started yet
    Planning,
    /// Being worked on
    Active,
    /// On hold
    Paused,
    /// Finished
    Done,
}

impl ProjectStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Planning, Self::Active, Self::Paused, Self::Done];

    /// Value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Done => "done",
        }
    }

    /// Emoji shown next to the project on the dashboard.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Planning => "📝",
            Self::Active => "🚧",
            Self::Paused => "⏸️",
            Self::Done => "✅",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Unknown project status '{s}'. Use one of: planning, active, paused, done"
                ))
            })
    }
}

/// State of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not started
    Todo,
    /// Someone is on it
    InProgress,
    /// Finished
    Done,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Checkbox-style marker for task lists.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Todo => "⬜",
            Self::InProgress => "🔄",
            Self::Done => "✅",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Unknown task status '{s}'. Use one of: todo, in_progress, done"
                ))
            })
    }
}

/// Progress summary of one project.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    /// The project
    pub project: project::Model,
    /// Parsed status (falls back to planning for unknown stored values)
    pub status: ProjectStatus,
    /// Tasks not started
    pub todo: usize,
    /// Tasks in progress
    pub in_progress: usize,
    /// Tasks finished
    pub done: usize,
}

impl ProjectSummary {
    /// Total number of tasks.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    /// Share of finished tasks as a percentage, 0 for a project without tasks.
    #[must_use]
    pub fn completion_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // task counts are small
        let percent = (self.done as f64 / total as f64) * 100.0;
        percent
    }
}

/// Creates a project after validating its name.
pub async fn create_project(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
    description: &str,
    created_by: &str,
) -> Result<project::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Project name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(Error::validation(format!(
            "Project name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(Error::validation(format!(
            "Project description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    if get_project_by_name(db, guild_id, name).await?.is_some() {
        return Err(Error::validation(format!(
            "A project named '{name}' already exists"
        )));
    }

    let now = Utc::now();
    let new_project = project::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        status: Set(ProjectStatus::Planning.as_str().to_string()),
        created_by: Set(created_by.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_project.insert(db).await.map_err(Into::into)
}

/// Finds a project by name within a guild, ignoring case.
pub async fn get_project_by_name(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
) -> Result<Option<project::Model>> {
    let wanted = name.trim().to_lowercase();
    Ok(list_projects(db, guild_id)
        .await?
        .into_iter()
        .find(|p| p.name.to_lowercase() == wanted))
}

/// Like [`get_project_by_name`] but a missing project is an error.
pub async fn require_project(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
) -> Result<project::Model> {
    get_project_by_name(db, guild_id, name)
        .await?
        .ok_or_else(|| Error::ProjectNotFound {
            name: name.to_string(),
        })
}

/// All projects of a guild, ordered alphabetically.
pub async fn list_projects(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<project::Model>> {
    Project::find()
        .filter(project::Column::GuildId.eq(guild_id))
        .order_by_asc(project::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a project's lifecycle status.
pub async fn update_project_status(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
    status: ProjectStatus,
) -> Result<project::Model> {
    let existing = require_project(db, guild_id, name).await?;
    let mut active_model: project::ActiveModel = existing.into();
    active_model.status = Set(status.as_str().to_string());
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a project and all of its tasks. Returns the number of tasks removed.
pub async fn delete_project(db: &DatabaseConnection, guild_id: &str, name: &str) -> Result<u64> {
    let existing = require_project(db, guild_id, name).await?;

    let txn = db.begin().await?;
    let removed = Task::delete_many()
        .filter(task::Column::ProjectId.eq(existing.id))
        .exec(&txn)
        .await?
        .rows_affected;
    Project::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(removed)
}

/// Adds a task to a project.
pub async fn add_task(
    db: &DatabaseConnection,
    project_id: i64,
    title: &str,
    assignee: Option<String>,
) -> Result<task::Model> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Task title cannot be empty"));
    }
    if title.chars().count() > MAX_TASK_TITLE_CHARS {
        return Err(Error::validation(format!(
            "Task title must be at most {MAX_TASK_TITLE_CHARS} characters"
        )));
    }
    if Project::find_by_id(project_id).one(db).await?.is_none() {
        return Err(Error::ProjectNotFound {
            name: project_id.to_string(),
        });
    }

    let new_task = task::ActiveModel {
        project_id: Set(project_id),
        title: Set(title.to_string()),
        status: Set(TaskStatus::Todo.as_str().to_string()),
        assignee: Set(assignee),
        created_at: Set(Utc::now()),
        completed_at: Set(None),
        ..Default::default()
    };
    new_task.insert(db).await.map_err(Into::into)
}

/// Finds a task by ID.
pub async fn get_task(db: &DatabaseConnection, task_id: i64) -> Result<Option<task::Model>> {
    Task::find_by_id(task_id).one(db).await.map_err(Into::into)
}

/// Moves a task to `status`. `completed_at` is set on done and cleared otherwise.
pub async fn set_task_status(
    db: &DatabaseConnection,
    task_id: i64,
    status: TaskStatus,
) -> Result<task::Model> {
    let existing = get_task(db, task_id)
        .await?
        .ok_or(Error::TaskNotFound { id: task_id })?;

    let completed_at = (status == TaskStatus::Done).then(Utc::now);
    let mut active_model: task::ActiveModel = existing.into();
    active_model.status = Set(status.as_str().to_string());
    active_model.completed_at = Set(completed_at);
    active_model.update(db).await.map_err(Into::into)
}

/// Like [`set_task_status`] but only for tasks of projects in `guild_id`.
///
/// Tasks of other guilds are reported as not found.
pub async fn set_guild_task_status(
    db: &DatabaseConnection,
    guild_id: &str,
    task_id: i64,
    status: TaskStatus,
) -> Result<(project::Model, task::Model)> {
    let project = Task::find_by_id(task_id)
        .find_also_related(Project)
        .one(db)
        .await?
        .and_then(|(_, project)| project)
        .filter(|project| project.guild_id == guild_id)
        .ok_or(Error::TaskNotFound { id: task_id })?;

    let updated = set_task_status(db, task_id, status).await?;
    Ok((project, updated))
}

/// Tasks of a project, oldest first.
pub async fn list_tasks(db: &DatabaseConnection, project_id: i64) -> Result<Vec<task::Model>> {
    Task::find()
        .filter(task::Column::ProjectId.eq(project_id))
        .order_by_asc(task::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Progress summaries for every project of a guild.
pub async fn project_summaries(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<ProjectSummary>> {
    let projects = Project::find()
        .filter(project::Column::GuildId.eq(guild_id))
        .order_by_asc(project::Column::Name)
        .find_with_related(Task)
        .all(db)
        .await?;

    Ok(projects
        .into_iter()
        .map(|(project, tasks)| {
            let mut summary = ProjectSummary {
                status: project.status.parse().unwrap_or(ProjectStatus::Planning),
                project,
                todo: 0,
                in_progress: 0,
                done: 0,
            };
            for task in &tasks {
                match task.status.parse().unwrap_or(TaskStatus::Todo) {
                    TaskStatus::Todo => summary.todo += 1,
                    TaskStatus::InProgress => summary.in_progress += 1,
                    TaskStatus::Done => summary.done += 1,
                }
            }
            summary
        })
        .collect())
}
