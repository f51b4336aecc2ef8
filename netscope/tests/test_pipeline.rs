use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use netscope::domain::{AddressFamily, Direction, IfIndex, PacketType, Protocol, TrafficEvent};
use netscope::flow::FlowStore;
use netscope::pipeline::{channel, Offer, PipelineNotice};
use netscope::scheduler::{drain_pending, spawn_poller};
use netscope_common::{AF_INET, DIRECTION_EGRESS, IPPROTO_UDP, TRAFFIC_RECORD_LEN};

fn event(dport: u16) -> TrafficEvent {
    TrafficEvent {
        protocol: Protocol::TCP,
        direction: Direction::Egress,
        family: AddressFamily::Inet,
        src: "10.0.0.2".parse().unwrap(),
        dst: "93.184.216.34".parse().unwrap(),
        src_port: 40000,
        dst_port: dport,
        ifindex: IfIndex(2),
        packet_type: PacketType::Outgoing,
        bytes: 64,
        timestamp: 0,
    }
}

#[test]
fn test_three_offers_into_two_slots() {
    let (producer, consumer) = channel(2, 8);

    assert_eq!(producer.offer(event(1)), Offer::Accepted);
    assert_eq!(producer.offer(event(2)), Offer::Accepted);
    assert_eq!(producer.offer(event(3)), Offer::Dropped);

    // Exactly one notice for the one drop
    assert_eq!(consumer.next_notice(), Some(PipelineNotice::EventDropped));
    assert_eq!(consumer.next_notice(), None);

    // Retained events keep insertion order
    let ports: Vec<u16> = consumer.drain().iter().map(|ev| ev.dst_port).collect();
    assert_eq!(ports, vec![1, 2]);
}

#[test]
fn test_ingestion_continues_after_drop() {
    let (producer, consumer) = channel(1, 1);
    producer.offer(event(1));
    assert_eq!(producer.offer(event(2)), Offer::Dropped);

    let store = FlowStore::new(10);
    assert_eq!(drain_pending(&consumer, &store), 1);
    assert_eq!(producer.offer(event(3)), Offer::Accepted);
    assert_eq!(drain_pending(&consumer, &store), 1);
    assert_eq!(store.counts().raw, 2);
    assert_eq!(consumer.stats().dropped(), 1);
}

/// One packed little-endian sample as the kernel side writes it
fn udp_sample() -> Vec<u8> {
    let mut buf = Vec::with_capacity(TRAFFIC_RECORD_LEN);
    buf.push(IPPROTO_UDP);
    buf.push(DIRECTION_EGRESS);
    buf.extend_from_slice(&[10, 0, 0, 2]);
    buf.extend_from_slice(&[1, 1, 1, 1]);
    buf.extend_from_slice(&[0u8; 32]);
    buf.extend_from_slice(&5353u16.to_le_bytes());
    buf.extend_from_slice(&53u16.to_le_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes());
    buf.extend_from_slice(&AF_INET.to_le_bytes());
    buf.extend_from_slice(&4u32.to_le_bytes());
    buf.extend_from_slice(&80u64.to_le_bytes());
    buf
}

#[test]
fn test_raw_record_reaches_store_through_poller() {
    let bytes = udp_sample();
    assert_eq!(bytes.len(), TRAFFIC_RECORD_LEN);

    let (producer, consumer) = channel(16, 1);
    let store = Arc::new(FlowStore::new(10));
    let poller = spawn_poller(consumer, Arc::clone(&store)).unwrap();

    assert_eq!(producer.offer_raw(&bytes), Offer::Accepted);
    assert_eq!(producer.offer_raw(&bytes[..10]), Offer::Malformed);
    drop(producer);

    assert_eq!(poller.join().unwrap(), 1);
    let raw = store.raw_snapshot();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].dst, "1.1.1.1".parse::<IpAddr>().unwrap());
    assert_eq!(raw[0].protocol, Protocol::UDP);
    assert!(raw[0].timestamp > 0);
}

#[test]
fn test_poll_reports_idle_then_closed() {
    let (producer, consumer) = channel(4, 1);
    assert_eq!(consumer.poll(Duration::from_millis(5)), netscope::pipeline::Poll::Idle);
    drop(producer);
    assert_eq!(consumer.poll(Duration::from_millis(5)), netscope::pipeline::Poll::Closed);
}
