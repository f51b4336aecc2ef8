use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::{CAUTION_AMBER, CRITICAL_RED, HUD_GREEN, INFO_DIM};
use crate::flow::StoreCounts;
use crate::view::ViewKind;

const STYLE_DIM: Style = Style::new().fg(INFO_DIM);
const STYLE_KEY: Style = Style::new().fg(CAUTION_AMBER);

/// Everything the header line shows, captured once per tick
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub view: ViewKind,
    pub counts: StoreCounts,
    pub visible: usize,
    pub dropped: u64,
    pub filter: String,
    pub following: bool,
    pub show_local: bool,
}

fn flag(on: bool) -> Span<'static> {
    if on {
        Span::styled("on", Style::new().fg(HUD_GREEN))
    } else {
        Span::styled("off", STYLE_DIM)
    }
}

impl StatusLine {
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let filter = if self.filter.is_empty() { "none".to_string() } else { self.filter.clone() };
        let drop_style = if self.dropped > 0 { Style::new().fg(CRITICAL_RED) } else { STYLE_DIM };

        let line = Line::from(vec![
            Span::styled("NETSCOPE", Style::new().fg(HUD_GREEN).add_modifier(Modifier::BOLD)),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(
                format!("[{}]", self.view),
                Style::new().fg(CRITICAL_RED).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(format!("{} events", self.counts.raw), Style::new().fg(CAUTION_AMBER)),
            Span::styled(format!(" ({} total)", self.counts.recorded), STYLE_DIM),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(format!("{} flows", self.counts.flows), Style::new().fg(CAUTION_AMBER)),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(format!("{} shown", self.visible), Style::new().fg(HUD_GREEN)),
            Span::styled(" | ", STYLE_DIM),
            Span::styled(format!("{} dropped", self.dropped), drop_style),
            Span::styled(" | Filter: ", STYLE_DIM),
            Span::styled(filter, Style::new().fg(HUD_GREEN)),
            Span::styled(" | Follow: ", STYLE_DIM),
            flag(self.following),
            Span::styled(" | Local: ", STYLE_DIM),
            flag(self.show_local),
        ]);

        let header = Paragraph::new(line).block(
            Block::default().borders(Borders::ALL).border_style(Style::new().fg(CRITICAL_RED)),
        );
        f.render_widget(header, area);
    }
}

/// Footer: the pending notice if any, otherwise key help
pub fn render_footer(f: &mut Frame, area: Rect, notice: Option<&str>, offset: usize) {
    let line = match notice {
        Some(message) => Line::from(Span::styled(
            format!(" {message}"),
            Style::new().fg(CRITICAL_RED).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(vec![
            Span::styled("Q", STYLE_KEY),
            Span::styled(":Quit ", STYLE_DIM),
            Span::styled("Tab", STYLE_KEY),
            Span::styled(":View ", STYLE_DIM),
            Span::styled("F", STYLE_KEY),
            Span::styled(":Filter ", STYLE_DIM),
            Span::styled("C", STYLE_KEY),
            Span::styled(":Clear ", STYLE_DIM),
            Span::styled("↑/↓", STYLE_KEY),
            Span::styled(":Scroll ", STYLE_DIM),
            Span::styled("A", STYLE_KEY),
            Span::styled(":Follow ", STYLE_DIM),
            Span::styled("L", STYLE_KEY),
            Span::styled(":Local ", STYLE_DIM),
            Span::styled(format!("[row {offset}]"), STYLE_DIM),
        ]),
    };

    let footer = Paragraph::new(line).block(
        Block::default().borders(Borders::ALL).border_style(Style::new().fg(HUD_GREEN)),
    );
    f.render_widget(footer, area);
}

/// Filter input line while editing
pub fn render_filter_input(f: &mut Frame, area: Rect, view: ViewKind, text: &str) {
    let keys = match view {
        ViewKind::Raw => "proto src dst sport dport dir",
        ViewKind::Flows => "proto ip port minbytes maxbytes",
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("Filter: ", Style::new().fg(HUD_GREEN)),
        Span::styled(format!("{text}_"), Style::new().fg(CAUTION_AMBER)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Filter {view} [{keys}] (Enter to apply, Esc to cancel)"))
            .border_style(Style::new().fg(CAUTION_AMBER)),
    );
    f.render_widget(input, area);
}
