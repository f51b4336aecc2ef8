//! # Terminal User Interface (TUI)
//!
//! Live traffic dashboard using `ratatui`.
//!
//! ## Views
//!
//! - **Raw** - the capped event log in arrival order (default)
//! - **Flows** - per-flow aggregates, largest total first, with owner labels
//!
//! ## Loop
//!
//! Redraws happen on the [`Ticker`] (30 Hz). Each tick drains the pipeline
//! into the store, rebuilds the visible rows and re-clamps the scroll
//! position. Between ticks the loop waits for input for at most the time
//! left until the next tick.
//!
//! ## Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | `Tab` | Toggle raw / flows |
//! | `f` | Edit filter (`Enter` apply, `Esc` cancel) |
//! | `c` | Clear filter |
//! | `l` | Show / hide local traffic |
//! | `a` | Toggle auto-follow |
//! | `↑` `↓` `PgUp` `PgDn` | Scroll (stops auto-follow) |
//! | `q` / `Ctrl+C` | Quit |
//!
//! ## Sub-Modules
//!
//! - `raw_table` / `flow_table` - column layout and row formatting
//! - `status` - header, footer and filter input
//! - `layout` - responsive vertical split
//! - `theme` - color scheme

#![allow(clippy::needless_pass_by_value)]

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

pub mod flow_table;
pub mod format;
pub mod layout;
pub mod raw_table;
mod status;
mod theme;

use layout::compute_layout;
use status::{render_filter_input, render_footer, StatusLine};
use theme::SEPARATOR;

use crate::classification::{InterfaceNames, IpClassifier};
use crate::domain::TrafficEvent;
use crate::filter::FilterState;
use crate::flow::{FlowAggregate, FlowKey, FlowStore};
use crate::ownership::OwnerResolver;
use crate::pipeline::Consumer;
use crate::scheduler::{drain_pending, ScrollState, Ticker};
use crate::view::{flow_rows, raw_rows, ViewKind};

/// Initial UI settings from the command line
#[derive(Debug, Clone, Copy)]
pub struct LiveOptions {
    pub view: ViewKind,
    pub show_local: bool,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self { view: ViewKind::Raw, show_local: true }
    }
}

/// TUI state for the live dashboard
pub struct LiveApp {
    consumer: Consumer,
    store: Arc<FlowStore>,
    resolver: OwnerResolver,
    classifier: IpClassifier,
    interfaces: InterfaceNames,

    // Rows of the active view as of the last tick
    raw: Vec<TrafficEvent>,
    flows: Vec<(FlowKey, FlowAggregate)>,
    lines: Vec<Line<'static>>,
    status: StatusLine,

    // UI state
    view: ViewKind,
    filters: FilterState,
    /// Filter text while the input line is open
    editing: Option<String>,
    show_local: bool,
    scroll: ScrollState,
    table_height: usize,
    notice: Option<&'static str>,
    should_quit: bool,
}

impl LiveApp {
    #[must_use]
    pub fn new(
        consumer: Consumer,
        store: Arc<FlowStore>,
        resolver: OwnerResolver,
        options: LiveOptions,
    ) -> Self {
        Self {
            consumer,
            store,
            resolver,
            classifier: IpClassifier::new(),
            interfaces: InterfaceNames::new(),
            raw: Vec::new(),
            flows: Vec::new(),
            lines: Vec::new(),
            status: StatusLine::default(),
            view: options.view,
            filters: FilterState::new(),
            editing: None,
            show_local: options.show_local,
            scroll: ScrollState::new(),
            table_height: 0,
            notice: None,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn view(&self) -> ViewKind {
        self.view
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Rows in the active view after filtering, before scrolling
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.view {
            ViewKind::Raw => self.raw.len(),
            ViewKind::Flows => self.flows.len(),
        }
    }

    /// Formatted rows inside the viewport as of the last tick
    #[must_use]
    pub fn visible_lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// One redraw tick for a table `height` rows tall
    pub fn on_tick(&mut self, height: usize) {
        drain_pending(&self.consumer, &self.store);
        if self.consumer.is_closed() {
            info!("Pipeline closed, leaving dashboard");
            self.should_quit = true;
        }
        while let Some(notice) = self.consumer.next_notice() {
            self.notice = Some(notice.message());
        }

        match self.view {
            ViewKind::Raw => {
                self.raw = raw_rows(&self.store, &self.filters.raw, &self.classifier, self.show_local);
                self.flows.clear();
            }
            ViewKind::Flows => {
                self.flows = flow_rows(&self.store, &self.filters.flows, self.show_local);
                self.raw.clear();
            }
        }

        let total = self.row_count();
        self.table_height = height;
        self.scroll.update(total, height);
        self.lines = self.format_visible(total, height);

        self.status = StatusLine {
            view: self.view,
            counts: self.store.counts(),
            visible: total,
            dropped: self.consumer.stats().dropped(),
            filter: self.filters.describe(self.view),
            following: self.scroll.is_following(),
            show_local: self.show_local,
        };
    }

    /// Only rows inside the viewport are formatted or sent for ownership lookup
    fn format_visible(&mut self, total: usize, height: usize) -> Vec<Line<'static>> {
        let range = self.scroll.visible(total, height);
        match self.view {
            ViewKind::Raw => self.raw[range]
                .iter()
                .map(|ev| {
                    let kind = self.classifier.classify(ev.remote_ip());
                    raw_table::row(ev, kind, self.interfaces.name(ev.ifindex))
                })
                .collect(),
            ViewKind::Flows => self.flows[range]
                .iter()
                .map(|(key, agg)| flow_table::row(key, agg, &self.resolver.resolve(key.ip())))
                .collect(),
        }
    }

    /// Process one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        self.notice = None;

        if self.editing.is_some() {
            self.handle_edit_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            KeyCode::Tab => {
                self.filters.switch_view(self.view);
                self.view = self.view.toggle();
                self.scroll = ScrollState::new();
            }
            KeyCode::Char('f' | 'F' | '/') => {
                self.editing = Some(self.filters.describe(self.view));
            }
            KeyCode::Char('c' | 'C') => self.filters.clear(),
            KeyCode::Char('l' | 'L') => self.show_local = !self.show_local,
            KeyCode::Char('a' | 'A') => self.scroll.toggle_follow(),
            KeyCode::Up => self.scroll.scroll_up(1),
            KeyCode::Down => self.scroll.scroll_down(1),
            KeyCode::PageUp => self.scroll.scroll_up(self.table_height.max(1)),
            KeyCode::PageDown => self.scroll.scroll_down(self.table_height.max(1)),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                let text = self.editing.take().unwrap_or_default();
                self.filters.commit(self.view, &text);
                self.scroll = ScrollState::new();
            }
            KeyCode::Backspace => {
                if let Some(text) = self.editing.as_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.editing.as_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn render(&self, f: &mut Frame) {
        let area = f.area();
        let layout = compute_layout(area.height, self.is_editing());
        let [header, table, filter, footer] = layout.split(area);

        if layout.show_header {
            self.status.render(f, header);
        }
        self.render_table(f, table);
        if let Some(text) = &self.editing {
            render_filter_input(f, filter, self.view, text);
        }
        if layout.show_footer {
            render_footer(f, footer, self.notice, self.scroll.offset());
        }
    }

    fn render_table(&self, f: &mut Frame, area: Rect) {
        let (title, column_header, rule) = match self.view {
            ViewKind::Raw => (" Raw events ", raw_table::header(), raw_table::rule()),
            ViewKind::Flows => (" Flows ", flow_table::header(), flow_table::rule()),
        };
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(column_header);
        lines.push(rule);
        lines.extend(self.lines.iter().cloned());

        let table = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::new().fg(SEPARATOR)),
        );
        f.render_widget(table, area);
    }
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut LiveApp) -> Result<()> {
    let mut ticker = Ticker::default();
    loop {
        if ticker.is_due(Instant::now()) {
            let size = terminal.size()?;
            let layout = compute_layout(size.height, app.is_editing());
            app.on_tick(layout.table_rows(size.height));
            terminal.draw(|f| app.render(f))?;
            ticker.reschedule(Instant::now());
        }

        // Input never delays the next tick
        if event::poll(ticker.until_next(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

/// Run the live dashboard until the user quits.
///
/// # Errors
/// Returns an error if the terminal can't be set up, drawn to, or restored
pub fn run_live(
    consumer: Consumer,
    store: Arc<FlowStore>,
    resolver: OwnerResolver,
    options: LiveOptions,
) -> Result<()> {
    // -------------------------------------------------------------------------
    // Terminal Setup
    // -------------------------------------------------------------------------
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = LiveApp::new(consumer, store, resolver, options);
    let result = event_loop(&mut terminal, &mut app);

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("TUI closed");
    result
}
