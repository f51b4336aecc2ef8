//! Aggregated flow table

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::format::{
    fixed_width, fixed_width_right, format_bytes, header_line, row_line, rule_line, Column,
};
use super::theme::{protocol_color, CRITICAL_RED, HUD_GREEN, INTERFACE};
use crate::flow::{FlowAggregate, FlowKey};

pub const COLUMNS: [Column; 8] = [
    ("IP", 45),
    ("PORT", 5),
    ("PROTOCOL", 8),
    ("COUNT", 8),
    ("INGRESS", 12),
    ("EGRESS", 12),
    ("TOTAL", 12),
    ("OWNER", 30),
];

#[must_use]
pub fn header() -> Line<'static> {
    header_line(&COLUMNS, Style::new().fg(HUD_GREEN).add_modifier(Modifier::BOLD))
}

#[must_use]
pub fn rule() -> Line<'static> {
    rule_line(&COLUMNS)
}

/// One formatted flow with its owner label
#[must_use]
pub fn row(key: &FlowKey, agg: &FlowAggregate, owner: &str) -> Line<'static> {
    let left = |i: usize, text: &str| fixed_width(text, COLUMNS[i].1);
    let right = |i: usize, text: &str| fixed_width_right(text, COLUMNS[i].1);

    row_line(vec![
        Span::raw(left(0, &key.ip().to_string())),
        Span::raw(left(1, &key.port.to_string())),
        Span::styled(left(2, &key.protocol.to_string()), Style::new().fg(protocol_color(key.protocol))),
        Span::styled(left(3, &agg.packets.to_string()), Style::new().fg(INTERFACE)),
        Span::styled(right(4, &format_bytes(agg.ingress_bytes)), Style::new().fg(CRITICAL_RED)),
        Span::styled(right(5, &format_bytes(agg.egress_bytes)), Style::new().fg(HUD_GREEN)),
        Span::raw(right(6, &format_bytes(agg.total_bytes))),
        Span::raw(right(7, owner)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;

    #[test]
    fn test_row_text() {
        let key = FlowKey::new("93.184.216.34".parse().unwrap(), 443, Protocol::TCP);
        let agg = FlowAggregate {
            packets: 2,
            ingress_bytes: 200,
            egress_bytes: 100,
            total_bytes: 300,
            is_local: false,
        };
        let line = row(&key, &agg, "Edgecast Inc.");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.starts_with("93.184.216.34 "));
        assert!(text.contains("TCP"));
        assert!(text.contains("300 B"));
        assert!(text.ends_with("Edgecast Inc."));
        assert_eq!(line.width(), header().width());
    }
}
