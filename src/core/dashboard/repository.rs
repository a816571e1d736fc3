//! Dashboard repository - ORM reads and writes of dashboard configuration.

use super::{DashboardKind, view::ButtonStyle};
use crate::{
    entities::{
        Dashboard, DashboardComponent, DashboardMessage, dashboard, dashboard_component,
        dashboard_message,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Returns the guild's dashboard of `kind`, creating it with default buttons if needed.
///
/// An existing but inactive dashboard is reactivated. Components are only seeded on
/// creation, so buttons disabled by an admin stay disabled.
pub async fn ensure_dashboard(
    db: &DatabaseConnection,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<dashboard::Model> {
    if let Some(existing) = get_dashboard(db, guild_id, kind).await? {
        if existing.is_active {
            return Ok(existing);
        }
        return set_active(db, existing.id, true).await;
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let created = dashboard::ActiveModel {
        guild_id: Set(guild_id.to_string()),
        kind: Set(kind.as_str().to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let components = kind
        .default_buttons()
        .iter()
        .zip(0..)
        .map(|(button, position)| dashboard_component::ActiveModel {
            dashboard_id: Set(created.id),
            action: Set(button.action.to_string()),
            label: Set(button.label.to_string()),
            style: Set(button.style.as_str().to_string()),
            position: Set(position),
            is_enabled: Set(true),
            ..Default::default()
        })
        .collect::<Vec<_>>();
    if !components.is_empty() {
        DashboardComponent::insert_many(components).exec(&txn).await?;
    }

    txn.commit().await?;
    Ok(created)
}

/// The guild's dashboard of `kind`, active or not.
pub async fn get_dashboard(
    db: &DatabaseConnection,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<Option<dashboard::Model>> {
    Dashboard::find()
        .filter(dashboard::Column::GuildId.eq(guild_id))
        .filter(dashboard::Column::Kind.eq(kind.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_dashboard`] but fails with [`Error::DashboardNotFound`].
pub async fn require_dashboard(
    db: &DatabaseConnection,
    guild_id: &str,
    kind: DashboardKind,
) -> Result<dashboard::Model> {
    get_dashboard(db, guild_id, kind)
        .await?
        .ok_or_else(|| Error::DashboardNotFound {
            kind: kind.as_str().to_string(),
        })
}

/// All dashboards of a guild, ordered by kind.
pub async fn list_dashboards(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Vec<dashboard::Model>> {
    Dashboard::find()
        .filter(dashboard::Column::GuildId.eq(guild_id))
        .order_by_asc(dashboard::Column::Kind)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Activates or deactivates a dashboard.
pub async fn set_active(
    db: &DatabaseConnection,
    dashboard_id: i64,
    is_active: bool,
) -> Result<dashboard::Model> {
    let existing = Dashboard::find_by_id(dashboard_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::DashboardNotFound {
            kind: format!("#{dashboard_id}"),
        })?;

    let mut active_model: dashboard::ActiveModel = existing.into();
    active_model.is_active = Set(is_active);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Buttons of a dashboard, ordered by position.
pub async fn components(
    db: &DatabaseConnection,
    dashboard_id: i64,
) -> Result<Vec<dashboard_component::Model>> {
    DashboardComponent::find()
        .filter(dashboard_component::Column::DashboardId.eq(dashboard_id))
        .order_by_asc(dashboard_component::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Enables or disables one button. Unknown actions are a validation error.
pub async fn set_component_enabled(
    db: &DatabaseConnection,
    dashboard_id: i64,
    action: &str,
    is_enabled: bool,
) -> Result<dashboard_component::Model> {
    let existing = DashboardComponent::find()
        .filter(dashboard_component::Column::DashboardId.eq(dashboard_id))
        .filter(dashboard_component::Column::Action.eq(action))
        .one(db)
        .await?
        .ok_or_else(|| Error::validation(format!("This dashboard has no '{action}' button")))?;

    let mut active_model: dashboard_component::ActiveModel = existing.into();
    active_model.is_enabled = Set(is_enabled);
    active_model.update(db).await.map_err(Into::into)
}

/// Style of a stored component.
#[must_use]
pub fn component_style(component: &dashboard_component::Model) -> ButtonStyle {
    ButtonStyle::from_stored(&component.style)
}

/// Records where a dashboard is posted, replacing any previous location.
pub async fn record_message(
    db: &DatabaseConnection,
    dashboard_id: i64,
    channel_id: &str,
    message_id: &str,
) -> Result<dashboard_message::Model> {
    let now = Utc::now();

    if let Some(existing) = get_message(db, dashboard_id).await? {
        let mut active_model: dashboard_message::ActiveModel = existing.into();
        active_model.channel_id = Set(channel_id.to_string());
        active_model.message_id = Set(message_id.to_string());
        active_model.updated_at = Set(now);
        return active_model.update(db).await.map_err(Into::into);
    }

    dashboard_message::ActiveModel {
        dashboard_id: Set(dashboard_id),
        channel_id: Set(channel_id.to_string()),
        message_id: Set(message_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Where a dashboard is posted, if anywhere.
pub async fn get_message(
    db: &DatabaseConnection,
    dashboard_id: i64,
) -> Result<Option<dashboard_message::Model>> {
    DashboardMessage::find()
        .filter(dashboard_message::Column::DashboardId.eq(dashboard_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Forgets where a dashboard is posted. Returns whether a row was removed.
pub async fn clear_message(db: &DatabaseConnection, dashboard_id: i64) -> Result<bool> {
    let result = DashboardMessage::delete_many()
        .filter(dashboard_message::Column::DashboardId.eq(dashboard_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Every active dashboard together with its posted message.
pub async fn posted_dashboards(
    db: &DatabaseConnection,
) -> Result<Vec<(dashboard::Model, dashboard_message::Model)>> {
    let rows = Dashboard::find()
        .filter(dashboard::Column::IsActive.eq(true))
        .find_with_related(DashboardMessage)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(dashboard, mut messages)| {
            let message = messages.pop()?;
            Some((dashboard, message))
        })
        .collect())
}
