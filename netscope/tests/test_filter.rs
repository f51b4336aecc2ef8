use std::net::IpAddr;

use netscope::domain::{AddressFamily, Direction, IfIndex, PacketType, Protocol, TrafficEvent};
use netscope::filter::{apply, matches, FilterState, FlowFilter, RawFilter};
use netscope::flow::{FlowAggregate, FlowKey, FlowStore};
use netscope::view::{flow_rows, ViewKind};

fn event(proto: Protocol, direction: Direction, dst: &str, dport: u16) -> TrafficEvent {
    TrafficEvent {
        protocol: proto,
        direction,
        family: AddressFamily::Inet,
        src: "10.0.0.2".parse().unwrap(),
        dst: dst.parse().unwrap(),
        src_port: 40000,
        dst_port: dport,
        ifindex: IfIndex(2),
        packet_type: PacketType::Outgoing,
        bytes: 100,
        timestamp: 0,
    }
}

fn sample() -> Vec<TrafficEvent> {
    vec![
        event(Protocol::TCP, Direction::Egress, "10.1.2.3", 80),
        event(Protocol::TCP, Direction::Egress, "11.0.0.0", 8080),
        event(Protocol::UDP, Direction::Ingress, "8.8.8.8", 53),
        event(Protocol::ICMPV4, Direction::Egress, "1.1.1.1", 0),
    ]
}

#[test]
fn test_empty_filter_is_identity() {
    let rows = sample();
    assert_eq!(apply(rows.clone(), &RawFilter::parse("")), rows);
    assert_eq!(apply(rows.clone(), &RawFilter::parse("bogus=1 noequals")), rows);
}

#[test]
fn test_single_field_equals_and_with_wildcards() {
    let rows = sample();
    let single = RawFilter::parse("proto=tcp");
    let combined = RawFilter { protocol: Some("tcp".to_string()), ..RawFilter::default() };
    for row in &rows {
        assert_eq!(matches(row, &single), matches(row, &combined));
    }
}

#[test]
fn test_fields_are_and_combined() {
    let rows = sample();
    let both = apply(rows.clone(), &RawFilter::parse("proto=tcp dport=80"));
    assert_eq!(both.len(), 1);

    let one = apply(rows.clone(), &RawFilter::parse("proto=tcp"));
    let other = apply(rows, &RawFilter::parse("dport=80"));
    assert!(both.iter().all(|r| one.contains(r) && other.contains(r)));
}

#[test]
fn test_cidr_on_destination() {
    let hits = apply(sample(), &RawFilter::parse("dst=10.0.0.0/8"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].dst, "10.1.2.3".parse::<IpAddr>().unwrap());
}

#[test]
fn test_port_exact_text() {
    let hits = apply(sample(), &RawFilter::parse("dport=80"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].dst_port, 80);
}

#[test]
fn test_direction_and_protocol_names() {
    assert_eq!(apply(sample(), &RawFilter::parse("dir=IN")).len(), 1);
    assert_eq!(apply(sample(), &RawFilter::parse("proto=ICMPV4")).len(), 1);
}

#[test]
fn test_flow_byte_bounds_through_view() {
    let store = FlowStore::new(100);
    for (dst, bytes) in [("1.0.0.1", 10u64), ("1.0.0.2", 500), ("1.0.0.3", 5000)] {
        let mut ev = event(Protocol::UDP, Direction::Egress, dst, 443);
        ev.bytes = bytes;
        store.record(ev);
    }

    let rows = flow_rows(&store, &FlowFilter::parse("minbytes=100 maxbytes=5000"), true);
    let totals: Vec<u64> = rows.iter().map(|(_, agg)| agg.total_bytes).collect();
    assert_eq!(totals, vec![5000, 500]);

    // An unparseable bound is no bound at all
    let rows = flow_rows(&store, &FlowFilter::parse("minbytes=lots"), true);
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_flow_ip_prefix_match() {
    let row = (
        FlowKey::new("2001:db8::42".parse().unwrap(), 443, Protocol::TCP),
        FlowAggregate::default(),
    );
    assert!(matches(&row, &FlowFilter::parse("ip=2001:db8::/32")));
    assert!(matches(&row, &FlowFilter::parse("ip=db8")));
    assert!(!matches(&row, &FlowFilter::parse("ip=10.0.0.0/8")));
}

#[test]
fn test_one_view_filtered_at_a_time() {
    let mut state = FilterState::new();
    state.commit(ViewKind::Raw, "proto=udp");
    state.commit(ViewKind::Flows, "port=53");
    assert!(!state.is_active(ViewKind::Raw));
    assert!(state.is_active(ViewKind::Flows));

    state.commit(ViewKind::Flows, "   ");
    assert_eq!(state, FilterState::default());
}
