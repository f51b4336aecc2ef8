//! Domain types providing compile-time safety and self-documentation
//!
//! These wrap the raw numeric tags carried by a capture record so that a
//! protocol number can't be mixed up with an interface index, and so that
//! every field has one canonical textual rendering (used both for display
//! and for filter matching).

use std::fmt;

use netscope_common::{AF_INET, AF_INET6, DIRECTION_EGRESS, DIRECTION_INGRESS};

/// IANA protocol number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Protocol(pub u8);

impl Protocol {
    pub const TCP: Protocol = Protocol(6);
    pub const UDP: Protocol = Protocol(17);
    pub const ICMPV4: Protocol = Protocol(1);
    pub const ICMPV6: Protocol = Protocol(58);

    /// Well-known name, if this protocol has one
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "IPv6HopByHop",
            1 => "ICMPv4",
            2 => "IGMP",
            4 => "IPv4",
            6 => "TCP",
            17 => "UDP",
            41 => "IPv6",
            47 => "GRE",
            50 => "ESP",
            51 => "AH",
            58 => "ICMPv6",
            132 => "SCTP",
            136 => "UDPLite",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Which way the packet crossed the cgroup boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    /// Decode the kernel's direction byte (`b'i'` / `b'o'`)
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            DIRECTION_INGRESS => Some(Direction::Ingress),
            DIRECTION_EGRESS => Some(Direction::Egress),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ingress => "in",
            Direction::Egress => "out",
        }
    }

    /// Arrow glyph for the TUI direction column
    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Ingress => "↓↓↓",
            Direction::Egress => "↑↑↑",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address family tag from `__sk_buff::family`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Inet,
    Inet6,
    Other(u32),
}

impl From<u32> for AddressFamily {
    fn from(raw: u32) -> Self {
        match raw {
            AF_INET => AddressFamily::Inet,
            AF_INET6 => AddressFamily::Inet6,
            other => AddressFamily::Other(other),
        }
    }
}

/// Link-layer packet classification (`skb->pkt_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Host,
    Broadcast,
    Multicast,
    OtherHost,
    Outgoing,
    Loopback,
    FastRoute,
    Unknown(u32),
}

impl From<u32> for PacketType {
    fn from(raw: u32) -> Self {
        match raw {
            0 => PacketType::Host,
            1 => PacketType::Broadcast,
            2 => PacketType::Multicast,
            3 => PacketType::OtherHost,
            4 => PacketType::Outgoing,
            5 => PacketType::Loopback,
            6 => PacketType::FastRoute,
            other => PacketType::Unknown(other),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketType::Host => "HOST",
            PacketType::Broadcast => "BROADCAST",
            PacketType::Multicast => "MULTICAST",
            PacketType::OtherHost => "OTHERHOST",
            PacketType::Outgoing => "OUTGOING",
            PacketType::Loopback => "LOOPBACK",
            PacketType::FastRoute => "FASTROUTE",
            PacketType::Unknown(raw) => return write!(f, "UNKNOWN({raw})"),
        };
        f.write_str(name)
    }
}

/// Network interface index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IfIndex(pub u32);

impl fmt::Display for IfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if#{}", self.0)
    }
}
