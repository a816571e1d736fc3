//! Text formatting helpers shared by the dashboard renderers and commands.
//!
//! All functions are pure and framework-agnostic.

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage (0-100, clamped for drawing)
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = if progress_percent.is_finite() {
        progress_percent.clamp(0.0, 100.0)
    } else {
        0.0
    };

    // clamped_progress ∈ [0, 100] and length is small, so the cast is exact enough for display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {clamped_progress:.1}%")
}

/// Percentage of `part` in `total`, 0 when `total` is 0.
#[must_use]
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (part / total) * 100.0
}

/// Formats a duration in seconds as `3d 4h 12m`, dropping leading zero units.
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{total_secs}s")
    }
}

/// Formats a byte count using binary units (`1.5 GiB`).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Green/yellow/red indicator for a usage percentage against its alert threshold.
///
/// Yellow starts ten points below the threshold.
#[must_use]
pub fn usage_emoji(percent: f64, threshold: f64) -> &'static str {
    if percent >= threshold {
        "🔴"
    } else if percent >= threshold - 10.0 {
        "🟡"
    } else {
        "🟢"
    }
}

/// Up/down indicator.
#[must_use]
pub const fn status_emoji(up: bool) -> &'static str {
    if up { "🟢" } else { "🔴" }
}

/// Maximum length of a plain Discord message.
pub const MESSAGE_LIMIT: usize = 2000;

/// Maximum length of an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Cuts `value` to at most `max_chars` characters, ending with `…` when shortened.
#[must_use]
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = value.chars().take(max_chars - 1).collect();
    cut.push('…');
    cut
}

/// Keeps as many whole lines of `text` as fit in `max_chars`, noting how many were dropped.
///
/// Falls back to [`truncate_chars`] when not even the first line fits.
#[must_use]
pub fn fit_lines(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut kept = String::new();
    let mut kept_chars = 0;

    for (index, line) in lines.iter().enumerate() {
        let remaining = lines.len() - index - 1;
        let note = format!("… and {remaining} more");
        let line_chars = line.chars().count() + usize::from(index > 0);
        // Room must stay for the note that replaces the lines after this one.
        let reserve = if remaining > 0 { note.chars().count() + 1 } else { 0 };
        if kept_chars + line_chars + reserve > max_chars {
            if index == 0 {
                return truncate_chars(text, max_chars);
            }
            kept.push('\n');
            kept.push_str(&format!("… and {} more", lines.len() - index));
            return kept;
        }
        if index > 0 {
            kept.push('\n');
        }
        kept.push_str(line);
        kept_chars += line_chars;
    }

    kept
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_format_progress_bar_full() {
        let bar = format_progress_bar(100.0, Some(10));
        assert_eq!(bar, "[██████████] 100.0%");
    }

    #[test]
    fn test_format_progress_bar_half() {
        let bar = format_progress_bar(50.0, Some(10));
        assert_eq!(bar, "[█████░░░░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_clamps_overflow() {
        let bar = format_progress_bar(150.0, Some(4));
        assert_eq!(bar, "[████] 100.0%");

        let bar = format_progress_bar(-20.0, Some(4));
        assert_eq!(bar, "[░░░░] 0.0%");
    }

    #[test]
    fn test_format_progress_bar_nan() {
        let bar = format_progress_bar(f64::NAN, None);
        assert_eq!(bar, "[░░░░░░░░░░] 0.0%");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1.0, 4.0), 25.0);
        assert_eq!(percent_of(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m");
        assert_eq!(format_duration(3 * 3600 + 60), "3h 1m");
        assert_eq!(format_duration(2 * 86_400 + 5 * 3600 + 7 * 60), "2d 5h 7m");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_usage_emoji() {
        assert_eq!(usage_emoji(50.0, 90.0), "🟢");
        assert_eq!(usage_emoji(85.0, 90.0), "🟡");
        assert_eq!(usage_emoji(90.0, 90.0), "🔴");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 4), "abc…");
        assert_eq!(truncate_chars("héllo wörld", 5).chars().count(), 5);
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_fit_lines_keeps_whole_lines() {
        let text = (0..500)
            .map(|i| format!("line number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let fitted = fit_lines(&text, MESSAGE_LIMIT);

        assert!(fitted.chars().count() <= MESSAGE_LIMIT);
        assert!(fitted.starts_with("line number 0\n"));
        let last = fitted.lines().last().unwrap_or_default();
        assert!(last.starts_with("… and "), "{last}");
        assert!(last.ends_with(" more"));

        let kept = fitted.lines().count() - 1;
        assert_eq!(last, format!("… and {} more", 500 - kept));
    }

    #[test]
    fn test_fit_lines_single_long_line() {
        let text = "x".repeat(5000);
        let fitted = fit_lines(&text, EMBED_DESCRIPTION_LIMIT);
        assert_eq!(fitted.chars().count(), EMBED_DESCRIPTION_LIMIT);
        assert!(fitted.ends_with('…'));

        assert_eq!(fit_lines("fits", MESSAGE_LIMIT), "fits");
    }
}
