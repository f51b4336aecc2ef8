//! Flow identity and per-flow counters.

use std::net::{IpAddr, Ipv6Addr};

use crate::classification::is_local;
use crate::domain::{Direction, Protocol, TrafficEvent};

/// Identity of a flow: remote endpoint plus protocol, direction-agnostic.
///
/// The address is stored in its 16-byte form (IPv4 as `::ffff:a.b.c.d`) so
/// IPv4 and IPv6 peers share one key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub ip: [u8; 16],
    pub port: u16,
    pub protocol: Protocol,
}

impl FlowKey {
    #[must_use]
    pub fn new(ip: IpAddr, port: u16, protocol: Protocol) -> Self {
        let ip = match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        };
        Self { ip, port, protocol }
    }

    /// Key of the flow `event` belongs to
    #[must_use]
    pub fn from_event(event: &TrafficEvent) -> Self {
        let (ip, port) = event.remote();
        Self::new(ip, port, event.protocol)
    }

    /// Remote address; mapped IPv4 comes back as IPv4
    #[must_use]
    pub fn ip(&self) -> IpAddr {
        let v6 = Ipv6Addr::from(self.ip);
        v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4)
    }
}

/// Running totals for one flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowAggregate {
    pub packets: u64,
    pub ingress_bytes: u64,
    pub egress_bytes: u64,
    /// Always `ingress_bytes + egress_bytes`
    pub total_bytes: u64,
    pub is_local: bool,
}

impl FlowAggregate {
    /// Fold one event into the totals
    pub fn fold(&mut self, event: &TrafficEvent, remote: IpAddr) {
        self.packets += 1;
        match event.direction {
            Direction::Ingress => self.ingress_bytes = self.ingress_bytes.saturating_add(event.bytes),
            Direction::Egress => self.egress_bytes = self.egress_bytes.saturating_add(event.bytes),
        }
        self.total_bytes = self.ingress_bytes.saturating_add(self.egress_bytes);
        self.is_local = is_local(remote);
    }
}
