//! Plain-text summaries for headless runs

use std::fmt::Write;

use crate::flow::FlowStore;
use crate::ownership::OwnerResolver;
use crate::pipeline::PipelineStats;
use crate::tui::format::format_bytes;
use crate::view::sort_flows;

/// Flows listed per summary
pub const TOP_FLOWS: usize = 5;

/// Counters line followed by the largest flows, one per line
#[must_use]
pub fn summary_lines(
    store: &FlowStore,
    stats: &PipelineStats,
    resolver: Option<&OwnerResolver>,
) -> Vec<String> {
    let counts = store.counts();
    let totals = store.totals();
    let mut lines = vec![format!(
        "stats: events={} flows={} bytes={} accepted={} dropped={} malformed={}",
        counts.recorded,
        counts.flows,
        format_bytes(totals.bytes),
        stats.accepted(),
        stats.dropped(),
        stats.malformed(),
    )];

    let mut flows = store.flow_snapshot();
    sort_flows(&mut flows);
    for (key, agg) in flows.iter().take(TOP_FLOWS) {
        let mut line = format!(
            "  {}:{} {} packets={} in={} out={} total={}",
            key.ip(),
            key.port,
            key.protocol,
            agg.packets,
            format_bytes(agg.ingress_bytes),
            format_bytes(agg.egress_bytes),
            format_bytes(agg.total_bytes),
        );
        if let Some(resolver) = resolver {
            let _ = write!(line, " owner={}", resolver.resolve(key.ip()));
        }
        lines.push(line);
    }
    lines
}

/// Print a summary to stderr
pub fn display_summary(store: &FlowStore, stats: &PipelineStats, resolver: Option<&OwnerResolver>) {
    for line in summary_lines(store, stats, resolver) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressFamily, Direction, IfIndex, PacketType, Protocol, TrafficEvent};

    fn event(dst: &str, dport: u16, bytes: u64) -> TrafficEvent {
        TrafficEvent {
            protocol: Protocol::UDP,
            direction: Direction::Egress,
            family: AddressFamily::Inet,
            src: "10.0.0.2".parse().unwrap(),
            dst: dst.parse().unwrap(),
            src_port: 5353,
            dst_port: dport,
            ifindex: IfIndex(2),
            packet_type: PacketType::Outgoing,
            bytes,
            timestamp: 0,
        }
    }

    #[test]
    fn test_summary_lists_largest_flows_first() {
        let store = FlowStore::new(100);
        for port in 1..=7u16 {
            store.record(event("1.1.1.1", port, u64::from(port) * 10));
        }
        let stats = PipelineStats::default();

        let lines = summary_lines(&store, &stats, None);
        assert_eq!(lines.len(), 1 + TOP_FLOWS);
        assert!(lines[0].contains("events=7"));
        assert!(lines[0].contains("flows=7"));
        assert!(lines[0].contains("bytes=280 B"));
        assert!(lines[1].contains("1.1.1.1:7 UDP"));
        assert!(lines[1].contains("total=70 B"));
        assert!(lines[5].contains("1.1.1.1:3 "));
    }

    #[test]
    fn test_summary_with_owner_labels() {
        let store = FlowStore::new(10);
        store.record(event("192.168.1.9", 53, 64));
        let (resolver, _queue) = OwnerResolver::with_queue(4);

        let lines = summary_lines(&store, &PipelineStats::default(), Some(&resolver));
        assert!(lines[1].ends_with("owner=local/private"));
    }
}
