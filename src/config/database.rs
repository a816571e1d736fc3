//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation uses `IF NOT EXISTS` and is safe
//! to run on every startup.

use crate::entities::{
    AdminGrant, Alert, AuditLog, CategoryMapping, ChannelMapping, Dashboard, DashboardComponent,
    DashboardMessage, Metric, Project, RateLimit, Session, Task, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Fallback used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/homelab_bot.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
#[must_use]
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Returns the on-disk path of a file-backed `SQLite` URL, `None` for in-memory or other backends.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// For file-backed `SQLite` URLs the parent directory is created first, so a fresh
/// checkout can start without manual setup.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let url = database_url();
    if let Some(parent) = sqlite_file_path(&url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Connecting to database");
    Database::connect(&url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    debug!("Ensuring table {}", entity.table_name());
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Parent tables are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Session).await?;
    create_table(db, &schema, AdminGrant).await?;
    create_table(db, &schema, RateLimit).await?;
    create_table(db, &schema, AuditLog).await?;
    create_table(db, &schema, CategoryMapping).await?;
    create_table(db, &schema, ChannelMapping).await?;
    create_table(db, &schema, Dashboard).await?;
    create_table(db, &schema, DashboardComponent).await?;
    create_table(db, &schema, DashboardMessage).await?;
    create_table(db, &schema, Project).await?;
    create_table(db, &schema, Task).await?;
    create_table(db, &schema, Metric).await?;
    create_table(db, &schema, Alert).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AdminGrantModel, DashboardModel, MetricModel, ProjectModel, TaskModel, UserModel,
    };
    use sea_orm::QuerySelect;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/bot.sqlite?mode=rwc"),
            Some(Path::new("data/bot.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/bot"), None);
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<AdminGrantModel> = AdminGrant::find().limit(1).all(&db).await?;
        let _: Vec<DashboardModel> = Dashboard::find().limit(1).all(&db).await?;
        let _: Vec<ProjectModel> = Project::find().limit(1).all(&db).await?;
        let _: Vec<TaskModel> = Task::find().limit(1).all(&db).await?;
        let _: Vec<MetricModel> = Metric::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
