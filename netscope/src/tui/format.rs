//! Fixed-width cell formatting shared by both tables

use chrono::{Local, TimeZone};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::theme::SEPARATOR;

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;
const TB: u64 = 1 << 40;
const PB: u64 = 1 << 50;

/// Column title and width in terminal cells
pub type Column = (&'static str, usize);

/// Pad with spaces or truncate to exactly `width` characters
#[must_use]
pub fn fixed_width(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        text.chars().take(width).collect()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

/// Like [`fixed_width`] but pads on the left
#[must_use]
pub fn fixed_width_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        text.chars().take(width).collect()
    } else {
        format!("{}{text}", " ".repeat(width - len))
    }
}

/// Human-readable byte count, 1024 base, two decimals above 1 KB
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn format_bytes(bytes: u64) -> String {
    let scaled = |unit: u64, suffix: &str| format!("{:.2} {suffix}", bytes as f64 / unit as f64);
    match bytes {
        b if b >= PB => scaled(PB, "PB"),
        b if b >= TB => scaled(TB, "TB"),
        b if b >= GB => scaled(GB, "GB"),
        b if b >= MB => scaled(MB, "MB"),
        b if b >= KB => scaled(KB, "KB"),
        b => format!("{b} B"),
    }
}

/// Local wall-clock `HH:MM:SS` for a Unix timestamp
#[must_use]
pub fn format_time(unix_secs: u64) -> String {
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map_or_else(|| "--:--:--".to_string(), |t| t.format("%H:%M:%S").to_string())
}

pub fn separator() -> Span<'static> {
    Span::styled("│", Style::new().fg(SEPARATOR))
}

/// Column titles joined by separators
#[must_use]
pub fn header_line(columns: &[Column], style: Style) -> Line<'static> {
    let mut spans = Vec::with_capacity(columns.len() * 2);
    for (i, (title, width)) in columns.iter().enumerate() {
        if i > 0 {
            spans.push(separator());
        }
        spans.push(Span::styled(fixed_width(title, *width), style));
    }
    Line::from(spans)
}

/// `───┼───` rule under the column titles
#[must_use]
pub fn rule_line(columns: &[Column]) -> Line<'static> {
    let rule = columns.iter().map(|(_, width)| "─".repeat(*width)).collect::<Vec<_>>().join("┼");
    Line::from(Span::styled(rule, Style::new().fg(SEPARATOR)))
}

/// Interleave styled cells with separators
#[must_use]
pub fn row_line(cells: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = Vec::with_capacity(cells.len() * 2);
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            spans.push(separator());
        }
        spans.push(cell);
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width() {
        assert_eq!(fixed_width("TCP", 5), "TCP  ");
        assert_eq!(fixed_width("OTHERHOST-LONG", 9), "OTHERHOST");
        assert_eq!(fixed_width_right("42", 5), "   42");
        // Width counts characters, not bytes
        assert_eq!(fixed_width("↑↑↑", 3), "↑↑↑");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * MB), "5.00 MB");
        assert_eq!(format_bytes(3 * PB), "3.00 PB");
    }

    #[test]
    fn test_rule_line_width() {
        let line = rule_line(&[("A", 2), ("B", 3)]);
        assert_eq!(line.width(), 6);
    }
}
