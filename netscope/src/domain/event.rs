//! The event record produced for every decoded packet observation.

use std::net::IpAddr;

use super::types::{AddressFamily, Direction, IfIndex, PacketType, Protocol};

/// One observed packet, as handed from the ingestion pipeline to the flow store.
///
/// Built once by the decoder and never mutated afterwards; the flow store
/// only ever clones it out for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficEvent {
    pub protocol: Protocol,
    pub direction: Direction,
    pub family: AddressFamily,
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub ifindex: IfIndex,
    pub packet_type: PacketType,
    pub bytes: u64,
    /// Unix time in seconds, assigned at ingestion
    pub timestamp: u64,
}

impl TrafficEvent {
    /// The peer on the far side of this packet: the destination for egress,
    /// the source for ingress.
    #[must_use]
    pub fn remote(&self) -> (IpAddr, u16) {
        match self.direction {
            Direction::Egress => (self.dst, self.dst_port),
            Direction::Ingress => (self.src, self.src_port),
        }
    }

    #[must_use]
    pub fn remote_ip(&self) -> IpAddr {
        self.remote().0
    }
}
