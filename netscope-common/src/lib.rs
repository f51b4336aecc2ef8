//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Defines the record written by the kernel-side `cgroup_skb` programs and
//! read back by userspace. The layout is packed so the kernel and userspace
//! agree byte-for-byte without relying on compiler padding.
//!
//! ## Key Types
//!
//! - [`TrafficRecord`] - One observed packet, emitted into [`TRAFFIC_RING_MAP`]

#![no_std]

// ============================================================================
// Map and Program Names
// ============================================================================

/// Ring buffer map carrying [`TrafficRecord`]s to userspace
pub const TRAFFIC_RING_MAP: &str = "TRAFFIC_RING";

/// `cgroup_skb/ingress` program name
pub const INGRESS_PROGRAM: &str = "monitor_ingress";

/// `cgroup_skb/egress` program name
pub const EGRESS_PROGRAM: &str = "monitor_egress";

// ============================================================================
// Field Values
// ============================================================================

/// Direction byte for packets entering the cgroup
pub const DIRECTION_INGRESS: u8 = b'i';

/// Direction byte for packets leaving the cgroup
pub const DIRECTION_EGRESS: u8 = b'o';

/// `AF_INET` as reported by `__sk_buff::family`
pub const AF_INET: u32 = 2;

/// `AF_INET6` as reported by `__sk_buff::family`
pub const AF_INET6: u32 = 10;

/// IANA protocol numbers the kernel side extracts ports for
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

/// Encoded size of a [`TrafficRecord`] in bytes
///
/// 1 + 1 + 4 + 4 + 16 + 16 + 2 + 2 + 4 + 4 + 4 + 8
pub const TRAFFIC_RECORD_LEN: usize = 66;

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Packet observation sent from eBPF to userspace via ring buffer
///
/// **Memory Layout**: `#[repr(C, packed)]`, little-endian on the supported
/// targets, exactly [`TRAFFIC_RECORD_LEN`] bytes.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct TrafficRecord {
    /// IANA protocol number from the IP header (`nexthdr` for IPv6)
    pub protocol: u8,

    /// [`DIRECTION_INGRESS`] or [`DIRECTION_EGRESS`]
    pub direction: u8,

    /// IPv4 source, as the raw header word (network byte order in memory)
    pub saddr: u32,

    /// IPv4 destination, as the raw header word (network byte order in memory)
    pub daddr: u32,

    /// IPv6 source (zeroed for IPv4)
    pub saddr_v6: [u8; 16],

    /// IPv6 destination (zeroed for IPv4)
    pub daddr_v6: [u8; 16],

    /// Source port in host order (0 when not TCP/UDP)
    pub sport: u16,

    /// Destination port in host order (0 when not TCP/UDP)
    pub dport: u16,

    /// Interface index the packet was seen on
    pub ifindex: u32,

    /// Address family ([`AF_INET`] / [`AF_INET6`])
    pub family: u32,

    /// `skb->pkt_type` (0 host, 1 broadcast, 2 multicast, 3 other host,
    /// 4 outgoing, 5 loopback, 6 fast route)
    pub pkttype: u32,

    /// `skb->len`
    pub bytes: u64,
}

impl TrafficRecord {
    /// An all-zero record for the kernel side to fill in
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            protocol: 0,
            direction: 0,
            saddr: 0,
            daddr: 0,
            saddr_v6: [0; 16],
            daddr_v6: [0; 16],
            sport: 0,
            dport: 0,
            ifindex: 0,
            family: 0,
            pkttype: 0,
            bytes: 0,
        }
    }
}

const _: () = assert!(core::mem::size_of::<TrafficRecord>() == TRAFFIC_RECORD_LEN);
