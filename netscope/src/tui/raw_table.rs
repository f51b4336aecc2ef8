//! Raw event log table

use std::net::SocketAddr;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::format::{fixed_width, format_time, header_line, row_line, rule_line, Column};
use super::theme::{direction_color, protocol_color, CAUTION_AMBER, HUD_GREEN, INTERFACE};
use crate::classification::{canonical, IpKind};
use crate::domain::TrafficEvent;

pub const COLUMNS: [Column; 9] = [
    ("Time", 8),
    ("Proto", 8),
    ("Dir", 3),
    ("IF", 8),
    ("Source", 45),
    ("Destination", 45),
    ("Bytes", 12),
    ("Type", 10),
    ("Pkttype", 9),
];

#[must_use]
pub fn header() -> Line<'static> {
    header_line(&COLUMNS, Style::new().fg(HUD_GREEN).add_modifier(Modifier::BOLD))
}

#[must_use]
pub fn rule() -> Line<'static> {
    rule_line(&COLUMNS)
}

/// One formatted event; `kind` classifies the remote endpoint
#[must_use]
pub fn row(ev: &TrafficEvent, kind: IpKind, interface: &str) -> Line<'static> {
    let cell = |i: usize, text: &str| fixed_width(text, COLUMNS[i].1);
    let source = SocketAddr::new(canonical(ev.src), ev.src_port).to_string();
    let destination = SocketAddr::new(canonical(ev.dst), ev.dst_port).to_string();

    row_line(vec![
        Span::raw(cell(0, &format_time(ev.timestamp))),
        Span::styled(cell(1, &ev.protocol.to_string()), Style::new().fg(protocol_color(ev.protocol))),
        Span::styled(cell(2, ev.direction.arrow()), Style::new().fg(direction_color(ev.direction))),
        Span::styled(cell(3, interface), Style::new().fg(INTERFACE)),
        Span::raw(cell(4, &source)),
        Span::raw(cell(5, &destination)),
        Span::raw(cell(6, &ev.bytes.to_string())),
        Span::styled(cell(7, kind.as_str()), Style::new().fg(CAUTION_AMBER)),
        Span::raw(cell(8, &ev.packet_type.to_string())),
    ])
}
