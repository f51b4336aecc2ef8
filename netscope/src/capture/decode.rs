//! # Traffic Record Decoding
//!
//! Turns one ring-buffer sample into a [`TrafficEvent`]. The sample is the
//! packed little-endian [`TrafficRecord`](netscope_common::TrafficRecord)
//! layout; it is decoded field by field rather than transmuted so a short or
//! corrupt sample is rejected instead of read out of bounds.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use netscope_common::TRAFFIC_RECORD_LEN;

use crate::domain::{
    AddressFamily, DecodeError, Direction, IfIndex, PacketType, Protocol, TrafficEvent,
};

/// Sequential little-endian reader over a length-checked buffer
struct LeReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> LeReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }
}

/// Pick the address the family tag says is populated.
///
/// IPv4 words are raw header words, so their little-endian bytes are the
/// octets in wire order. For an unknown family the 32-bit field wins when set.
fn select_addr(family: AddressFamily, v4: u32, v6: [u8; 16]) -> IpAddr {
    let v4_addr = || IpAddr::V4(Ipv4Addr::from(v4.to_le_bytes()));
    match family {
        AddressFamily::Inet => v4_addr(),
        AddressFamily::Inet6 => IpAddr::V6(Ipv6Addr::from(v6)),
        AddressFamily::Other(_) if v4 != 0 => v4_addr(),
        AddressFamily::Other(_) => IpAddr::V6(Ipv6Addr::from(v6)),
    }
}

/// Decode one sample, stamping it with the ingestion `timestamp` (Unix seconds).
///
/// # Errors
/// Returns [`DecodeError::Truncated`] for samples shorter than the record
/// layout and [`DecodeError::InvalidDirection`] for an unknown direction byte.
pub fn decode_event(bytes: &[u8], timestamp: u64) -> Result<TrafficEvent, DecodeError> {
    if bytes.len() < TRAFFIC_RECORD_LEN {
        return Err(DecodeError::Truncated { len: bytes.len(), expected: TRAFFIC_RECORD_LEN });
    }

    let mut r = LeReader::new(bytes);
    let protocol = Protocol(r.u8());
    let direction_byte = r.u8();
    let saddr = r.u32();
    let daddr = r.u32();
    let saddr_v6: [u8; 16] = r.take();
    let daddr_v6: [u8; 16] = r.take();
    let src_port = r.u16();
    let dst_port = r.u16();
    let ifindex = IfIndex(r.u32());
    let family = AddressFamily::from(r.u32());
    let packet_type = PacketType::from(r.u32());
    let bytes_len = r.u64();

    let direction =
        Direction::from_byte(direction_byte).ok_or(DecodeError::InvalidDirection(direction_byte))?;

    Ok(TrafficEvent {
        protocol,
        direction,
        family,
        src: select_addr(family, saddr, saddr_v6),
        dst: select_addr(family, daddr, daddr_v6),
        src_port,
        dst_port,
        ifindex,
        packet_type,
        bytes: bytes_len,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out a record the way the kernel side writes it
    #[allow(clippy::too_many_arguments)]
    fn encode(
        protocol: u8,
        direction: u8,
        saddr: [u8; 4],
        daddr: [u8; 4],
        v6: Option<([u8; 16], [u8; 16])>,
        sport: u16,
        dport: u16,
        family: u32,
        bytes: u64,
    ) -> Vec<u8> {
        let mut buf = Vec::with_capacity(TRAFFIC_RECORD_LEN);
        buf.push(protocol);
        buf.push(direction);
        buf.extend_from_slice(&saddr);
        buf.extend_from_slice(&daddr);
        let (s6, d6) = v6.unwrap_or(([0; 16], [0; 16]));
        buf.extend_from_slice(&s6);
        buf.extend_from_slice(&d6);
        buf.extend_from_slice(&sport.to_le_bytes());
        buf.extend_from_slice(&dport.to_le_bytes());
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(&family.to_le_bytes());
        buf.extend_from_slice(&4u32.to_le_bytes());
        buf.extend_from_slice(&bytes.to_le_bytes());
        buf
    }

    #[test]
    fn test_decode_ipv4_record() {
        let raw = encode(6, b'o', [10, 0, 0, 2], [93, 184, 216, 34], None, 51000, 443, 2, 1500);
        assert_eq!(raw.len(), TRAFFIC_RECORD_LEN);

        let ev = decode_event(&raw, 1_700_000_000).unwrap();
        assert_eq!(ev.protocol, Protocol::TCP);
        assert_eq!(ev.direction, Direction::Egress);
        assert_eq!(ev.src, "10.0.0.2".parse::<IpAddr>().unwrap());
        assert_eq!(ev.dst, "93.184.216.34".parse::<IpAddr>().unwrap());
        assert_eq!((ev.src_port, ev.dst_port), (51000, 443));
        assert_eq!(ev.ifindex, IfIndex(3));
        assert_eq!(ev.packet_type, PacketType::Outgoing);
        assert_eq!(ev.bytes, 1500);
        assert_eq!(ev.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_decode_ipv6_record() {
        let src: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let dst: Ipv6Addr = "2606:4700::6810:85e5".parse().unwrap();
        let raw = encode(17, b'i', [0; 4], [0; 4], Some((src.octets(), dst.octets())), 53, 40000, 10, 80);

        let ev = decode_event(&raw, 0).unwrap();
        assert_eq!(ev.family, AddressFamily::Inet6);
        assert_eq!(ev.src, IpAddr::V6(src));
        assert_eq!(ev.dst, IpAddr::V6(dst));
        assert_eq!(ev.direction, Direction::Ingress);
    }

    #[test]
    fn test_decode_with_shared_field_values() {
        use netscope_common::{AF_INET, DIRECTION_INGRESS, IPPROTO_UDP};

        // The shared crate's constants are all the decoder needs
        let raw = encode(IPPROTO_UDP, DIRECTION_INGRESS, [8, 8, 8, 8], [10, 0, 0, 2], None, 53, 40000, AF_INET, 90);
        let ev = decode_event(&raw, 0).unwrap();
        assert_eq!(ev.protocol, Protocol::UDP);
        assert_eq!(ev.direction, Direction::Ingress);
        assert_eq!(ev.family, AddressFamily::Inet);
        assert_eq!(ev.src, "8.8.8.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_truncated_record_rejected() {
        let raw = encode(6, b'o', [1, 1, 1, 1], [2, 2, 2, 2], None, 1, 2, 2, 3);
        let err = decode_event(&raw[..20], 0).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { len: 20, expected: TRAFFIC_RECORD_LEN });
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let raw = encode(6, b'x', [1, 1, 1, 1], [2, 2, 2, 2], None, 1, 2, 2, 3);
        assert_eq!(decode_event(&raw, 0).unwrap_err(), DecodeError::InvalidDirection(b'x'));
    }

    #[test]
    fn test_unknown_family_falls_back_to_set_field() {
        let raw = encode(6, b'o', [8, 8, 8, 8], [0; 4], None, 1, 2, 7, 3);
        let ev = decode_event(&raw, 0).unwrap();
        assert_eq!(ev.family, AddressFamily::Other(7));
        assert_eq!(ev.src, "8.8.8.8".parse::<IpAddr>().unwrap());
        assert_eq!(ev.dst, "::".parse::<IpAddr>().unwrap());
    }
}
