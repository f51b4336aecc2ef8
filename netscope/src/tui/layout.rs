//! Responsive layout for the TUI.
//!
//! The table always gets the remaining space. Header and footer are dropped
//! on very short terminals so a few rows of traffic stay visible.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

// Height breakpoint: below this only the table is drawn
const HEIGHT_MINIMAL: u16 = 12;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const FILTER_HEIGHT: u16 = 3;

/// Table chrome: borders (2) plus column header and separator rows
pub const TABLE_CHROME: u16 = 4;

/// Terminal size classification for layout decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSize {
    /// Height < 12: table only
    Minimal,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub size: TerminalSize,
    pub show_header: bool,
    pub show_footer: bool,
    /// Filter input line while editing
    pub show_filter: bool,
}

impl LayoutConfig {
    /// Split `area` into header, table, filter input and footer rects.
    /// Hidden sections get a zero-height rect.
    #[must_use]
    pub fn split(&self, area: Rect) -> [Rect; 4] {
        let height = |shown: bool, h: u16| Constraint::Length(if shown { h } else { 0 });
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                height(self.show_header, HEADER_HEIGHT),
                Constraint::Min(0),
                height(self.show_filter, FILTER_HEIGHT),
                height(self.show_footer, FOOTER_HEIGHT),
            ])
            .split(area);
        [chunks[0], chunks[1], chunks[2], chunks[3]]
    }

    /// Data rows that fit in the table for a terminal `height` rows tall
    #[must_use]
    pub fn table_rows(&self, height: u16) -> usize {
        let mut used = TABLE_CHROME;
        if self.show_header {
            used += HEADER_HEIGHT;
        }
        if self.show_footer {
            used += FOOTER_HEIGHT;
        }
        if self.show_filter {
            used += FILTER_HEIGHT;
        }
        usize::from(height.saturating_sub(used))
    }
}

/// Compute layout configuration based on terminal height.
///
/// | Terminal Size | Behavior |
/// |---------------|----------|
/// | Height < 12   | Minimal: table only, filter input still shown while editing |
/// | Otherwise     | Header, table, footer |
#[must_use]
pub fn compute_layout(height: u16, editing: bool) -> LayoutConfig {
    let minimal = height < HEIGHT_MINIMAL;
    LayoutConfig {
        size: if minimal { TerminalSize::Minimal } else { TerminalSize::Normal },
        show_header: !minimal,
        show_footer: !minimal,
        show_filter: editing,
    }
}
