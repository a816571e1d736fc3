//! Dashboards - Live embeds with buttons, one per guild and kind.
//!
//! - [`repository`] stores dashboard configuration (rows, buttons, posted message)
//! - [`render`] turns data into a [`view::DashboardView`]
//! - [`controller`] gathers the data for a kind and renders it
//! - [`registry`] keeps the in-memory map of where each dashboard is posted

pub mod controller;
pub mod registry;
pub mod render;
pub mod repository;
pub mod view;

pub use controller::{ActionResponse, build_view, handle_action};
pub use registry::{DashboardLocation, DashboardRegistry};
pub use view::{ButtonAction, ButtonStyle, DashboardView, ViewButton, ViewField};

use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The dashboard types the bot can post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DashboardKind {
    /// Greeting, rules and pointers for new members
    Welcome,
    /// Host metrics, services and open alerts
    Monitoring,
    /// Project progress
    Project,
    /// Game server reachability
    GameHub,
}

/// A button a dashboard gets when it is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultButton {
    /// Action name
    pub action: &'static str,
    /// Label
    pub label: &'static str,
    /// Style
    pub style: ButtonStyle,
}

const fn button(action: &'static str, label: &'static str, style: ButtonStyle) -> DefaultButton {
    DefaultButton {
        action,
        label,
        style,
    }
}

/// Action every kind except welcome supports: re-render in place.
pub const REFRESH_ACTION: &str = "refresh";

impl DashboardKind {
    /// Every kind, in provisioning order.
    pub const ALL: [Self; 4] = [Self::Welcome, Self::Monitoring, Self::Project, Self::GameHub];

    /// Stored and custom-ID form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Monitoring => "monitoring",
            Self::Project => "project",
            Self::GameHub => "gamehub",
        }
    }

    /// Embed title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Welcome => "👋 Welcome to the Homelab",
            Self::Monitoring => "📊 System Monitoring",
            Self::Project => "📋 Projects",
            Self::GameHub => "🎮 Game Servers",
        }
    }

    /// Embed colour.
    #[must_use]
    pub const fn color(self) -> u32 {
        match self {
            Self::Welcome => 0x0058_65F2,
            Self::Monitoring => 0x002E_CC71,
            Self::Project => 0x0034_98DB,
            Self::GameHub => 0x009B_59B6,
        }
    }

    /// Buttons seeded when the dashboard is created.
    #[must_use]
    pub const fn default_buttons(self) -> &'static [DefaultButton] {
        match self {
            Self::Welcome => WELCOME_BUTTONS,
            Self::Monitoring => MONITORING_BUTTONS,
            Self::Project => PROJECT_BUTTONS,
            Self::GameHub => GAMEHUB_BUTTONS,
        }
    }
}

const WELCOME_BUTTONS: &[DefaultButton] = &[
    button("rules", "📜 Rules", ButtonStyle::Primary),
    button("help", "❓ Help", ButtonStyle::Secondary),
];

const MONITORING_BUTTONS: &[DefaultButton] = &[
    button(REFRESH_ACTION, "🔄 Refresh", ButtonStyle::Primary),
    button("processes", "⚙️ Top processes", ButtonStyle::Secondary),
    button("alerts", "🚨 Alerts", ButtonStyle::Danger),
];

const PROJECT_BUTTONS: &[DefaultButton] = &[
    button(REFRESH_ACTION, "🔄 Refresh", ButtonStyle::Primary),
    button("active", "🚧 Active projects", ButtonStyle::Secondary),
];

const GAMEHUB_BUTTONS: &[DefaultButton] = &[
    button(REFRESH_ACTION, "🔄 Refresh", ButtonStyle::Primary),
    button("details", "📡 Connection info", ButtonStyle::Secondary),
];

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "welcome" => Ok(Self::Welcome),
            "monitoring" => Ok(Self::Monitoring),
            "project" | "projects" => Ok(Self::Project),
            "gamehub" | "game-hub" | "game_hub" => Ok(Self::GameHub),
            _ => Err(Error::validation(format!(
                "Unknown dashboard kind '{s}'. Use one of: welcome, monitoring, project, gamehub"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_roundtrip_and_aliases() {
        for kind in DashboardKind::ALL {
            assert_eq!(kind.as_str().parse::<DashboardKind>().ok(), Some(kind));
        }
        assert_eq!("Projects".parse::<DashboardKind>().ok(), Some(DashboardKind::Project));
        assert_eq!("game-hub".parse::<DashboardKind>().ok(), Some(DashboardKind::GameHub));
        assert!(matches!(
            "nope".parse::<DashboardKind>(),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_default_buttons_are_unique_per_kind() {
        for kind in DashboardKind::ALL {
            let buttons = kind.default_buttons();
            assert!(!buttons.is_empty());
            for (i, a) in buttons.iter().enumerate() {
                assert!(buttons[i + 1..].iter().all(|b| b.action != a.action));
            }
        }
    }
}
