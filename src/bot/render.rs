//! Conversion of framework-agnostic views into serenity builders, plus the
//! success/failure/info embeds used for command replies.

use crate::core::{
    dashboard::{ButtonStyle, DashboardView},
    format::{EMBED_DESCRIPTION_LIMIT, fit_lines},
};
use poise::serenity_prelude as serenity;

/// Green
pub const SUCCESS_COLOR: u32 = 0x002E_CC71;
/// Red
pub const FAILURE_COLOR: u32 = 0x00E7_4C3C;
/// Blue
pub const INFO_COLOR: u32 = 0x0034_98DB;

fn fit_description(content: String) -> String {
    if content.chars().count() <= EMBED_DESCRIPTION_LIMIT {
        content
    } else {
        fit_lines(&content, EMBED_DESCRIPTION_LIMIT)
    }
}

/// Embed for a successful action.
pub fn success_embed(content: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(fit_description(content.into()))
        .color(SUCCESS_COLOR)
}

/// Embed for a failed action.
pub fn failure_embed(content: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(fit_description(content.into()))
        .color(FAILURE_COLOR)
}

/// Embed for neutral information.
pub fn info_embed(content: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(fit_description(content.into()))
        .color(INFO_COLOR)
}

const fn button_style(style: ButtonStyle) -> serenity::ButtonStyle {
    match style {
        ButtonStyle::Primary => serenity::ButtonStyle::Primary,
        ButtonStyle::Secondary => serenity::ButtonStyle::Secondary,
        ButtonStyle::Success => serenity::ButtonStyle::Success,
        ButtonStyle::Danger => serenity::ButtonStyle::Danger,
    }
}

/// The view's embed.
#[must_use]
pub fn dashboard_embed(view: &DashboardView) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&view.title)
        .color(view.color)
        .fields(
            view.fields
                .iter()
                .map(|f| (f.name.clone(), f.value.clone(), f.inline)),
        );
    if !view.description.is_empty() {
        embed = embed.description(&view.description);
    }
    if let Some(footer) = &view.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }
    embed
}

/// The view's buttons, five per row.
#[must_use]
pub fn dashboard_components(view: &DashboardView) -> Vec<serenity::CreateActionRow> {
    view.button_rows()
        .into_iter()
        .map(|row| {
            serenity::CreateActionRow::Buttons(
                row.iter()
                    .map(|b| {
                        serenity::CreateButton::new(b.action.custom_id())
                            .label(&b.label)
                            .style(button_style(b.style))
                    })
                    .collect(),
            )
        })
        .collect()
}

/// A new message showing the view.
#[must_use]
pub fn dashboard_message(view: &DashboardView) -> serenity::CreateMessage {
    serenity::CreateMessage::new()
        .embed(dashboard_embed(view))
        .components(dashboard_components(view))
}

/// An edit replacing a message's content with the view.
#[must_use]
pub fn dashboard_edit(view: &DashboardView) -> serenity::EditMessage {
    serenity::EditMessage::new()
        .embed(dashboard_embed(view))
        .components(dashboard_components(view))
}
