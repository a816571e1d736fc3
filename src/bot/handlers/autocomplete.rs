//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module provides autocomplete functionality for command parameters like
//! project names and dashboard kinds, improving the user experience by suggesting
//! valid options as the user types.

use crate::{
    bot::Context,
    core::{
        dashboard::DashboardKind,
        projects::{self, ProjectStatus},
    },
};

/// Discord shows at most 25 suggestions.
const MAX_SUGGESTIONS: usize = 25;

fn filter_sorted<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching.dedup();
    matching
}

/// Provides autocomplete suggestions for project names in the current guild.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
///
/// # Returns
/// A vector of project names that match the partial input
pub async fn autocomplete_project_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let Some(guild_id) = ctx.guild_id() else {
        return Vec::new();
    };

    let Ok(all_projects) =
        projects::list_projects(&ctx.data().database, &guild_id.to_string()).await
    else {
        return Vec::new();
    };

    filter_sorted(all_projects.into_iter().map(|p| p.name), partial)
}

/// Provides autocomplete suggestions for dashboard kinds.
pub async fn autocomplete_dashboard_kind(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    filter_sorted(
        DashboardKind::ALL.iter().map(|k| k.as_str().to_string()),
        partial,
    )
}

/// Provides autocomplete suggestions for dashboard button actions across all kinds.
pub async fn autocomplete_dashboard_action(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    filter_sorted(
        DashboardKind::ALL
            .iter()
            .flat_map(|k| k.default_buttons())
            .map(|b| b.action.to_string()),
        partial,
    )
}

/// Provides autocomplete suggestions for project statuses.
pub async fn autocomplete_project_status(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    filter_sorted(
        ProjectStatus::ALL.iter().map(|s| s.as_str().to_string()),
        partial,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_sorted_is_case_insensitive() {
        let names = ["Nas Upgrade", "k8s", "backup-nas"].map(String::from);
        assert_eq!(filter_sorted(names, "NAS"), vec!["Nas Upgrade", "backup-nas"]);
    }

    #[test]
    fn test_filter_sorted_dedups_and_caps() {
        let many = (0..40).map(|i| format!("p{i:02}"));
        assert_eq!(filter_sorted(many, "p").len(), MAX_SUGGESTIONS);

        let repeated = ["refresh", "refresh", "rules"].map(String::from);
        assert_eq!(filter_sorted(repeated, "r"), vec!["refresh", "rules"]);
    }
}
