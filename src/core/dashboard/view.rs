//! Framework-agnostic dashboard view model.
//!
//! Renderers produce a [`DashboardView`]; the bot layer turns it into a serenity embed
//! and button rows. Button custom IDs use the `dash:<kind>:<action>` scheme so the
//! interaction handler can route a click without any lookup.

use super::DashboardKind;
use crate::core::format::truncate_chars;
use std::fmt;
use std::str::FromStr;

const CUSTOM_ID_PREFIX: &str = "dash";

/// Discord button styles the dashboards use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    /// Blurple
    Primary,
    /// Grey
    Secondary,
    /// Green
    Success,
    /// Red
    Danger,
}

impl ButtonStyle {
    /// Stored form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }

    /// Parses a stored style, falling back to secondary.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        match value {
            "primary" => Self::Primary,
            "success" => Self::Success,
            "danger" => Self::Danger,
            _ => Self::Secondary,
        }
    }
}

/// What a dashboard button does, encoded into its custom ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonAction {
    /// Dashboard the button belongs to
    pub kind: DashboardKind,
    /// Action name, e.g. `refresh`
    pub action: String,
}

impl ButtonAction {
    /// Creates an action for `kind`.
    pub fn new(kind: DashboardKind, action: impl Into<String>) -> Self {
        Self {
            kind,
            action: action.into(),
        }
    }

    /// `dash:<kind>:<action>`
    #[must_use]
    pub fn custom_id(&self) -> String {
        self.to_string()
    }

    /// Parses a custom ID. Returns `None` for IDs not produced by [`Self::custom_id`].
    #[must_use]
    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.splitn(3, ':');
        if parts.next()? != CUSTOM_ID_PREFIX {
            return None;
        }
        let kind = DashboardKind::from_str(parts.next()?).ok()?;
        let action = parts.next().filter(|a| !a.is_empty())?;
        Some(Self::new(kind, action))
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CUSTOM_ID_PREFIX}:{}:{}", self.kind.as_str(), self.action)
    }
}

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewField {
    /// Field title
    pub name: String,
    /// Field body
    pub value: String,
    /// Whether Discord may place it next to other inline fields
    pub inline: bool,
}

/// One button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewButton {
    /// Routing information
    pub action: ButtonAction,
    /// Visible label
    pub label: String,
    /// Colour
    pub style: ButtonStyle,
}

/// A rendered dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Embed title
    pub title: String,
    /// Embed description
    pub description: String,
    /// Embed side colour
    pub color: u32,
    /// Embed fields, at most [`DashboardView::MAX_FIELDS`]
    pub fields: Vec<ViewField>,
    /// Buttons, at most [`DashboardView::MAX_BUTTONS`]
    pub buttons: Vec<ViewButton>,
    /// Footer text
    pub footer: Option<String>,
    /// Fields dropped for exceeding Discord's limits
    pub omitted_fields: usize,
}

impl DashboardView {
    /// Discord's embed field limit.
    pub const MAX_FIELDS: usize = 25;
    /// Discord allows five rows of five buttons.
    pub const MAX_BUTTONS: usize = 25;
    /// Discord's field value limit, in characters.
    pub const MAX_FIELD_VALUE: usize = 1024;
    /// Discord's field name limit.
    pub const MAX_FIELD_NAME: usize = 256;
    /// Discord's title limit.
    pub const MAX_TITLE: usize = 256;
    /// Discord's description limit.
    pub const MAX_DESCRIPTION: usize = 4096;
    /// Discord's footer limit.
    pub const MAX_FOOTER: usize = 2048;
    /// Discord's button label limit.
    pub const MAX_BUTTON_LABEL: usize = 80;
    /// Discord rejects embeds whose text adds up to more than this.
    pub const MAX_TOTAL_CHARS: usize = 6000;

    /// Empty view with a title and colour.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            color,
            fields: Vec::new(),
            buttons: Vec::new(),
            footer: None,
            omitted_fields: 0,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a field. Fields past the limit are dropped and values are truncated.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        if self.fields.len() < Self::MAX_FIELDS {
            self.fields.push(ViewField {
                name: truncate_chars(&name.into(), Self::MAX_FIELD_NAME),
                value: truncate_chars(&value.into(), Self::MAX_FIELD_VALUE),
                inline,
            });
        } else {
            self.omitted_fields += 1;
        }
        self
    }

    /// Appends a button. Buttons past the limit are dropped.
    #[must_use]
    pub fn button(mut self, button: ViewButton) -> Self {
        if self.buttons.len() < Self::MAX_BUTTONS {
            self.buttons.push(button);
        }
        self
    }

    /// Sets the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Buttons grouped into rows of five.
    #[must_use]
    pub fn button_rows(&self) -> Vec<&[ViewButton]> {
        self.buttons.chunks(5).collect()
    }

    /// Characters Discord counts against [`Self::MAX_TOTAL_CHARS`].
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.title.chars().count()
            + self.description.chars().count()
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
            + self.footer.as_deref().map_or(0, |f| f.chars().count())
    }

    /// Clamps every part to Discord's per-part limits, then drops trailing fields
    /// until the whole embed fits [`Self::MAX_TOTAL_CHARS`]. Dropped fields are
    /// counted in the footer.
    #[must_use]
    pub fn fit_to_limits(mut self) -> Self {
        self.title = truncate_chars(&self.title, Self::MAX_TITLE);
        self.description = truncate_chars(&self.description, Self::MAX_DESCRIPTION);
        for field in &mut self.fields {
            field.name = truncate_chars(&field.name, Self::MAX_FIELD_NAME);
            field.value = truncate_chars(&field.value, Self::MAX_FIELD_VALUE);
        }
        for button in &mut self.buttons {
            button.label = truncate_chars(&button.label, Self::MAX_BUTTON_LABEL);
        }
        self.footer = self.footer.map(|f| truncate_chars(&f, Self::MAX_FOOTER));

        let base_footer = self.footer.take();
        loop {
            self.footer = noted_footer(base_footer.as_deref(), self.omitted_fields);
            if self.total_chars() <= Self::MAX_TOTAL_CHARS || self.fields.is_empty() {
                break;
            }
            self.fields.pop();
            self.omitted_fields += 1;
        }

        let excess = self.total_chars().saturating_sub(Self::MAX_TOTAL_CHARS);
        if excess > 0 {
            let keep = self.description.chars().count().saturating_sub(excess);
            self.description = truncate_chars(&self.description, keep);
        }
        self
    }
}

fn noted_footer(footer: Option<&str>, omitted: usize) -> Option<String> {
    let text = match (footer, omitted) {
        (footer, 0) => return footer.map(str::to_string),
        (Some(footer), n) => format!("{footer} · {n} more not shown"),
        (None, n) => format!("{n} more not shown"),
    };
    Some(truncate_chars(&text, DashboardView::MAX_FOOTER))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_custom_id_format_and_parse() {
        let action = ButtonAction::new(DashboardKind::GameHub, "refresh");
        assert_eq!(action.custom_id(), "dash:gamehub:refresh");
        assert_eq!(ButtonAction::parse("dash:gamehub:refresh"), Some(action));
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert_eq!(ButtonAction::parse("other:monitoring:refresh"), None);
        assert_eq!(ButtonAction::parse("dash:unknown:refresh"), None);
        assert_eq!(ButtonAction::parse("dash:monitoring:"), None);
        assert_eq!(ButtonAction::parse("dash:monitoring"), None);
    }

    #[test]
    fn test_action_may_contain_colons() {
        let parsed = ButtonAction::parse("dash:project:open:42").unwrap();
        assert_eq!(parsed.action, "open:42");
    }

    #[test]
    fn test_field_limits() {
        let mut view = DashboardView::new("t", 0);
        for i in 0..30 {
            view = view.field(format!("f{i}"), "v", true);
        }
        assert_eq!(view.fields.len(), DashboardView::MAX_FIELDS);
        assert_eq!(view.omitted_fields, 5);

        let long = "x".repeat(2000);
        let view = DashboardView::new("t", 0).field("long", long, false);
        assert_eq!(view.fields[0].value.chars().count(), DashboardView::MAX_FIELD_VALUE);
        assert!(view.fields[0].value.ends_with('…'));
    }

    #[test]
    fn test_fit_to_limits_drops_fields_over_total() {
        let mut view = DashboardView::new("Projects", 0).footer("Updated now");
        for i in 0..25 {
            view = view.field(format!("Project {i}"), "d".repeat(1000), false);
        }
        let view = view.fit_to_limits();

        assert!(view.total_chars() <= DashboardView::MAX_TOTAL_CHARS);
        assert!(view.fields.len() < 25);
        assert_eq!(view.fields.len() + view.omitted_fields, 25);
        let footer = view.footer.unwrap();
        assert!(footer.starts_with("Updated now · "));
        assert!(footer.ends_with(&format!("{} more not shown", view.omitted_fields)));
    }

    #[test]
    fn test_fit_to_limits_clamps_parts() {
        let view = DashboardView::new("t".repeat(300), 0)
            .description("x".repeat(5000))
            .footer("f".repeat(3000))
            .fit_to_limits();

        assert_eq!(view.title.chars().count(), DashboardView::MAX_TITLE);
        assert_eq!(view.footer.unwrap().chars().count(), DashboardView::MAX_FOOTER);
        assert!(view.description.chars().count() <= DashboardView::MAX_DESCRIPTION);
        assert_eq!(view.omitted_fields, 0);

        let small = DashboardView::new("t", 0).field("a", "b", true).fit_to_limits();
        assert_eq!(small.fields.len(), 1);
        assert_eq!(small.footer, None);
    }

    #[test]
    fn test_button_rows() {
        let mut view = DashboardView::new("t", 0);
        for i in 0..7 {
            view = view.button(ViewButton {
                action: ButtonAction::new(DashboardKind::Monitoring, format!("a{i}")),
                label: format!("A{i}"),
                style: ButtonStyle::Secondary,
            });
        }
        let rows = view.button_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_style_from_stored() {
        assert_eq!(ButtonStyle::from_stored("danger"), ButtonStyle::Danger);
        assert_eq!(ButtonStyle::from_stored("weird"), ButtonStyle::Secondary);
    }
}
