//! Visible rows for each view.
//!
//! Rows are snapshotted out of the [`FlowStore`], then filtered, stripped of
//! local traffic when hidden, and (for flows) sorted. Nothing here holds the
//! store lock while filtering.

use std::cmp::Reverse;
use std::fmt;

use clap::ValueEnum;

use crate::classification::IpClassifier;
use crate::domain::TrafficEvent;
use crate::filter::{apply, FlowFilter, RawFilter};
use crate::flow::{FlowAggregate, FlowKey, FlowStore};

/// Which table is on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewKind {
    /// Chronological event log
    #[default]
    Raw,
    /// Per-flow aggregates
    Flows,
}

impl ViewKind {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            ViewKind::Raw => ViewKind::Flows,
            ViewKind::Flows => ViewKind::Raw,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Raw => "RAW",
            ViewKind::Flows => "FLOWS",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Raw log rows in arrival order
#[must_use]
pub fn raw_rows(
    store: &FlowStore,
    filter: &RawFilter,
    classifier: &IpClassifier,
    show_local: bool,
) -> Vec<TrafficEvent> {
    let mut rows = apply(store.raw_snapshot(), filter);
    if !show_local {
        rows.retain(|ev| !classifier.classify(ev.remote_ip()).is_local());
    }
    rows
}

/// Descending total bytes, ascending port on ties
pub fn sort_flows(rows: &mut [(FlowKey, FlowAggregate)]) {
    rows.sort_by_key(|(key, agg)| (Reverse(agg.total_bytes), key.port));
}

/// Flow rows, largest first
#[must_use]
pub fn flow_rows(
    store: &FlowStore,
    filter: &FlowFilter,
    show_local: bool,
) -> Vec<(FlowKey, FlowAggregate)> {
    let mut rows = apply(store.flow_snapshot(), filter);
    if !show_local {
        rows.retain(|(_, agg)| !agg.is_local);
    }
    sort_flows(&mut rows);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressFamily, Direction, IfIndex, PacketType, Protocol};

    fn event(dst: &str, dport: u16, bytes: u64) -> TrafficEvent {
        TrafficEvent {
            protocol: Protocol::TCP,
            direction: Direction::Egress,
            family: AddressFamily::Inet,
            src: "10.0.0.2".parse().unwrap(),
            dst: dst.parse().unwrap(),
            src_port: 40000,
            dst_port: dport,
            ifindex: IfIndex(2),
            packet_type: PacketType::Outgoing,
            bytes,
            timestamp: 0,
        }
    }

    fn store() -> FlowStore {
        let store = FlowStore::new(100);
        store.record(event("1.1.1.1", 443, 500));
        store.record(event("192.168.1.5", 22, 900));
        store.record(event("8.8.8.8", 53, 500));
        store.record(event("9.9.9.9", 80, 10));
        store
    }

    #[test]
    fn test_flow_order() {
        let rows = flow_rows(&store(), &FlowFilter::default(), true);
        let ports: Vec<u16> = rows.iter().map(|(k, _)| k.port).collect();
        assert_eq!(ports, vec![22, 53, 443, 80]);
    }

    #[test]
    fn test_hide_local() {
        let rows = flow_rows(&store(), &FlowFilter::default(), false);
        assert!(rows.iter().all(|(k, _)| k.port != 22));

        let raw = raw_rows(&store(), &RawFilter::default(), &IpClassifier::new(), false);
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_raw_filter_keeps_arrival_order() {
        let raw = raw_rows(&store(), &RawFilter::parse("dst=.1"), &IpClassifier::new(), true);
        let dsts: Vec<String> = raw.iter().map(|e| e.dst.to_string()).collect();
        assert_eq!(dsts, vec!["1.1.1.1", "192.168.1.5"]);
    }

    #[test]
    fn test_view_toggle() {
        assert_eq!(ViewKind::Raw.toggle(), ViewKind::Flows);
        assert_eq!(ViewKind::Flows.toggle().to_string(), "RAW");
    }
}
